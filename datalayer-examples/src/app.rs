use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use datalayer::types::{BrandId, CategoryId, OrderId, ProductId};
use datalayer::{
    CatalogItem, DataLayerError, DataLayerEvent, DataLayerRenderer, EngineOptions, ItemEndpoints,
    PageRequest, View,
};
use datalayer_memory::Storefront;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The storefront the engine reads from
    pub shop: Storefront,
    /// Engine tuning
    pub options: EngineOptions,
}

impl AppState {
    /// State over `shop` with default engine options.
    pub fn new(shop: Storefront) -> Self {
        Self {
            shop,
            options: EngineOptions::default(),
        }
    }

    fn renderer(&self) -> DataLayerRenderer<'_> {
        DataLayerRenderer::new(self.shop.stores(), self.options.clone())
    }

    fn endpoints(&self) -> ItemEndpoints<'_> {
        ItemEndpoints::new(self.shop.stores(), self.options.clone())
    }
}

/// Error body returned when the engine fails.
#[derive(Debug, Serialize)]
#[allow(missing_docs)]
pub struct ErrorResponse {
    pub error: String,
}

/// An engine failure as an HTTP response.
#[derive(Debug)]
pub struct ApiError(DataLayerError);

impl From<DataLayerError> for ApiError {
    fn from(err: DataLayerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            DataLayerError::NotFound { .. } => StatusCode::NOT_FOUND,
            DataLayerError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            DataLayerError::Configuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DataLayerError::CycleDetected { .. } | DataLayerError::Store(_) => {
                error!(error = %self.0, "engine failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Route parameters of a rendered page.
#[derive(Debug, Default, Deserialize)]
#[allow(missing_docs)]
pub struct PageParams {
    pub category_id: Option<u64>,
    pub brand_id: Option<u64>,
    pub product_id: Option<u64>,
    pub order_id: Option<u64>,
}

impl PageParams {
    fn into_request(self, view: &str) -> PageRequest {
        let mut request = PageRequest::new(view);
        request.category_id = self.category_id.map(CategoryId::new);
        request.brand_id = self.brand_id.map(BrandId::new);
        request.product_id = self.product_id.map(ProductId::new);
        request.order_id = self.order_id.map(OrderId::new);
        request
    }
}

/// `POST /googletagmanager/getItem` with `{"productUrl": ...}`.
pub async fn get_item(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<CatalogItem>>, ApiError> {
    Ok(Json(state.endpoints().item_by_url(&body).await?))
}

/// `POST /googletagmanager/getCartItem` with `{"pseId": ..., "quantity": ...}`.
pub async fn get_cart_item(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<CatalogItem>>, ApiError> {
    Ok(Json(state.endpoints().cart_item(&body).await?))
}

/// `GET /pages/{view}`: the dataLayer events of the page head.
pub async fn render_page(
    State(state): State<AppState>,
    Path(view): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<DataLayerEvent>>, ApiError> {
    let request = params.into_request(&view);
    Ok(Json(state.renderer().head_events(&request).await?))
}

/// `POST /pages/{view}/listing` with the product ids a loop rendered.
pub async fn track_listing(
    State(state): State<AppState>,
    Path(view): Path<String>,
    Json(ids): Json<Vec<u64>>,
) -> Result<StatusCode, ApiError> {
    let ids: Vec<ProductId> = ids.into_iter().map(ProductId::new).collect();
    state
        .renderer()
        .staging()
        .track_listing(&View::from(view.as_str()), &ids)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /products/{id}/viewed` after a product page rendered.
pub async fn track_product(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state
        .renderer()
        .staging()
        .record_item(ProductId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /customers/login` after a successful login.
pub async fn track_login(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.renderer().staging().record_login().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /customers/registration` after a successful registration.
pub async fn track_registration(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.renderer().staging().record_registration().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Builds the application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/googletagmanager/getItem", post(get_item))
        .route("/googletagmanager/getCartItem", post(get_cart_item))
        .route("/pages/{view}", get(render_page))
        .route("/pages/{view}/listing", post(track_listing))
        .route("/products/{id}/viewed", post(track_product))
        .route("/customers/login", post(track_login))
        .route("/customers/registration", post(track_registration))
        .with_state(state)
}
