use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockroom API",
        version = "0.3.0",
        description = r#"
# Stockroom Multi-Store Inventory API

Tracks the item catalog and stock levels for every store, moves stock between
stores through the transfer lifecycle, and keeps an append-only change ledger
for auditing.

## Transfers

Transfers walk `pending -> approved -> in_transit -> completed` (a pending
transfer may also be `cancelled`). Completing a transfer settles stock at both
stores: the source is decremented (negative stock is allowed and meaningful),
the destination is incremented or created, and a `transfer_out`/`transfer_in`
ledger pair is written per line item.

## Soft deletes

Deleting an inventory record rewrites its name to the `DELETED` sentinel so
the per-store sync agents observe the change; listings exclude such rows but
direct lookups return them.

## Pagination

Inventory listings accept `page` and `pageSize` (default 50, max 200) and
return pagination metadata alongside the items.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "inventory", description = "Per-store item catalog and stock levels"),
        (name = "transfers", description = "Inter-store transfer lifecycle"),
        (name = "changes", description = "Append-only inventory change ledger"),
        (name = "stores", description = "Store directory"),
        (name = "departments", description = "Department lookups")
    ),
    paths(
        // Inventory
        crate::handlers::inventory::list_inventory,
        crate::handlers::inventory::get_inventory,
        crate::handlers::inventory::create_inventory,
        crate::handlers::inventory::update_inventory,
        crate::handlers::inventory::delete_inventory,

        // Transfers
        crate::handlers::transfers::list_transfers,
        crate::handlers::transfers::get_transfer,
        crate::handlers::transfers::create_transfer,
        crate::handlers::transfers::update_transfer_status,
        crate::handlers::transfers::delete_transfer,

        // Change ledger
        crate::handlers::changes::list_changes,
        crate::handlers::changes::record_change,

        // Stores & departments
        crate::handlers::stores::list_stores,
        crate::handlers::stores::create_store,
        crate::handlers::departments::list_departments,
    ),
    components(
        schemas(
            crate::handlers::inventory::CreateInventoryRequest,
            crate::handlers::inventory::UpdateInventoryRequest,
            crate::handlers::inventory::PaginationMeta,
            crate::handlers::transfers::CreateTransferRequest,
            crate::handlers::transfers::TransferItemRequest,
            crate::handlers::transfers::TransitionRequest,
            crate::handlers::transfers::TransferResponse,
            crate::handlers::transfers::TransferItemResponse,
            crate::handlers::changes::RecordChangeRequest,
            crate::handlers::stores::CreateStoreRequest,
            crate::services::stores::StoreSummary,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_includes_core_paths() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string(&openapi).unwrap();
        assert!(json.contains("Stockroom API"));
        assert!(json.contains("/api/v1/transfers/{id}/status"));
        assert!(json.contains("/api/v1/inventory"));
        assert!(json.contains("/api/v1/reports/changes"));
    }
}
