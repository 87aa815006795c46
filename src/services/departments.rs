use crate::{
    entities::department::{self, Entity as Department},
    errors::ServiceError,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::instrument;

/// Read-through department lookups.
#[derive(Clone)]
pub struct DepartmentService {
    db: Arc<DatabaseConnection>,
}

impl DepartmentService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_departments(
        &self,
        store_id: Option<String>,
    ) -> Result<Vec<department::Model>, ServiceError> {
        let mut query = Department::find().order_by_asc(department::Column::DeptId);
        if let Some(store_id) = store_id {
            query = query.filter(department::Column::StoreId.eq(store_id));
        }
        query.all(&*self.db).await.map_err(ServiceError::db_error)
    }
}
