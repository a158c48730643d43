//! Cart and checkout flows against the mock backend.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use dapur_core::{OrderError, OrderId, OrderStatus, PaymentMethod, Price, ProductId, ShippingAddress};
use dapur_integration_tests::{MockBackend, TEST_TOKEN, product};
use dapur_storefront::backend::BackendError;
use dapur_storefront::checkout::{CheckoutDetails, CheckoutError};
use dapur_storefront::error::AppError;
use dapur_storefront::state::AppState;
use serde_json::json;
use tempfile::TempDir;

async fn kitchen() -> MockBackend {
    MockBackend::start(vec![
        product("nasi-goreng", "Nasi Goreng", 25_000, "Makanan", 10),
        product("kopi", "Kopi Susu", 18_000, "Minuman", 3),
        product("sate", "Sate Ayam", 30_000, "Makanan", 0),
    ])
    .await
}

fn details(method: PaymentMethod) -> CheckoutDetails {
    CheckoutDetails {
        shipping_address: ShippingAddress {
            full_name: "Budi Santoso".to_string(),
            address: "Jl. Merdeka No. 10".to_string(),
            city: "Bandung".to_string(),
            postal_code: "40111".to_string(),
            phone: "081234567890".to_string(),
        },
        payment_method: method,
        notes: "Pedas sedang".to_string(),
    }
}

fn cart_file(dir: &TempDir) -> String {
    std::fs::read_to_string(dir.path().join("cart.json")).unwrap()
}

#[tokio::test]
async fn test_add_to_cart_clamps_to_backend_stock() {
    let backend = kitchen().await;
    let dir = tempfile::tempdir().unwrap();
    let mut state = AppState::new(backend.config(dir.path(), None)).unwrap();
    let kopi = ProductId::new("kopi");

    assert!(state.add_to_cart(&kopi, 2).await.unwrap());
    assert!(state.add_to_cart(&kopi, 5).await.unwrap());
    assert_eq!(state.cart().cart().quantity_of(&kopi), 3);

    // Already at the stock limit
    assert!(!state.add_to_cart(&kopi, 1).await.unwrap());

    // Out of stock
    assert!(!state.add_to_cart(&ProductId::new("sate"), 1).await.unwrap());
    assert_eq!(state.cart().total_items(), 3);
}

#[tokio::test]
async fn test_add_unknown_product_is_not_found() {
    let backend = kitchen().await;
    let dir = tempfile::tempdir().unwrap();
    let mut state = AppState::new(backend.config(dir.path(), None)).unwrap();

    let err = state
        .add_to_cart(&ProductId::new("rendang"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Backend(BackendError::NotFound(_))));
    assert!(!err.is_internal());
    assert!(!dir.path().join("cart.json").exists());
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let backend = kitchen().await;
    let dir = tempfile::tempdir().unwrap();

    {
        let mut state = AppState::new(backend.config(dir.path(), None)).unwrap();
        state
            .add_to_cart(&ProductId::new("nasi-goreng"), 2)
            .await
            .unwrap();
        state.add_to_cart(&ProductId::new("kopi"), 1).await.unwrap();
    }

    let state = AppState::new(backend.config(dir.path(), None)).unwrap();
    assert_eq!(state.cart().total_items(), 3);
    assert_eq!(state.cart().total_price(), Price::new(68_000));
    assert_eq!(
        state.quote(PaymentMethod::Cod).total_price,
        Price::new(73_000)
    );
    assert_eq!(
        state.quote(PaymentMethod::QrisMandiri).total_price,
        Price::new(68_000)
    );
}

#[tokio::test]
async fn test_checkout_submits_order_and_clears_cart() {
    let backend = kitchen().await;
    let dir = tempfile::tempdir().unwrap();
    let mut state = AppState::new(backend.config(dir.path(), Some(TEST_TOKEN))).unwrap();

    state
        .add_to_cart(&ProductId::new("nasi-goreng"), 2)
        .await
        .unwrap();
    state.add_to_cart(&ProductId::new("kopi"), 1).await.unwrap();

    let order = state.checkout(details(PaymentMethod::Cod)).await.unwrap();

    assert_eq!(order.id, OrderId::new("order-1"));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_price, Price::new(73_000));
    assert_eq!(order.total_items(), 3);
    assert!(!order.awaiting_payment());
    assert_eq!(order.order_items[0].product_label(), "Nasi Goreng");

    assert!(state.cart().cart().is_empty());
    assert_eq!(cart_file(&dir), "[]");

    let submissions = backend.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(
        submissions[0],
        json!({
            "orderItems": [
                { "product": "nasi-goreng", "quantity": 2, "price": 25000 },
                { "product": "kopi", "quantity": 1, "price": 18000 }
            ],
            "shippingAddress": {
                "fullName": "Budi Santoso",
                "address": "Jl. Merdeka No. 10",
                "city": "Bandung",
                "postalCode": "40111",
                "phone": "081234567890"
            },
            "paymentMethod": "COD",
            "itemsPrice": 68000,
            "shippingPrice": 5000,
            "totalPrice": 73000,
            "notes": "Pedas sedang"
        })
    );
    assert_eq!(
        backend.authorization_headers(),
        vec![Some(format!("Bearer {TEST_TOKEN}"))]
    );
}

#[tokio::test]
async fn test_prepaid_checkout_has_free_shipping() {
    let backend = kitchen().await;
    let dir = tempfile::tempdir().unwrap();
    let mut state = AppState::new(backend.config(dir.path(), Some(TEST_TOKEN))).unwrap();

    state.add_to_cart(&ProductId::new("kopi"), 2).await.unwrap();
    let order = state
        .checkout(details(PaymentMethod::BankMandiri))
        .await
        .unwrap();

    assert_eq!(order.shipping_price, Price::ZERO);
    assert_eq!(order.total_price, Price::new(36_000));
    assert!(order.awaiting_payment());
    assert_eq!(backend.submissions()[0]["paymentMethod"], "BANK_MANDIRI");
}

#[tokio::test]
async fn test_rejected_order_keeps_cart() {
    let backend = kitchen().await;
    backend.reject_orders(StatusCode::BAD_REQUEST, "Stok Kopi Susu tidak mencukupi");
    let dir = tempfile::tempdir().unwrap();
    let mut state = AppState::new(backend.config(dir.path(), Some(TEST_TOKEN))).unwrap();

    state.add_to_cart(&ProductId::new("kopi"), 3).await.unwrap();
    let saved = cart_file(&dir);

    let err = state
        .checkout(details(PaymentMethod::Cod))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Backend(BackendError::Api { status: 400, .. })
    ));
    let err = AppError::from(err);
    assert!(!err.is_internal());
    assert_eq!(err.user_message(), "Stok Kopi Susu tidak mencukupi");

    assert_eq!(state.cart().total_items(), 3);
    assert_eq!(cart_file(&dir), saved);
    assert_eq!(backend.submissions().len(), 1);
}

#[tokio::test]
async fn test_server_error_keeps_cart() {
    let backend = kitchen().await;
    backend.reject_orders(StatusCode::INTERNAL_SERVER_ERROR, "MongoServerError");
    let dir = tempfile::tempdir().unwrap();
    let mut state = AppState::new(backend.config(dir.path(), Some(TEST_TOKEN))).unwrap();

    state.add_to_cart(&ProductId::new("kopi"), 1).await.unwrap();
    let err = AppError::from(
        state
            .checkout(details(PaymentMethod::Cod))
            .await
            .unwrap_err(),
    );

    assert!(err.is_internal());
    assert_eq!(err.user_message(), "External service error");
    assert_eq!(state.cart().total_items(), 1);
}

#[tokio::test]
async fn test_checkout_without_token_is_not_sent() {
    let backend = kitchen().await;
    let dir = tempfile::tempdir().unwrap();
    let mut state = AppState::new(backend.config(dir.path(), None)).unwrap();

    state.add_to_cart(&ProductId::new("kopi"), 1).await.unwrap();
    let err = state
        .checkout(details(PaymentMethod::Cod))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Backend(BackendError::MissingToken)
    ));
    assert_eq!(backend.requests("/api/orders"), 0);
    assert_eq!(state.cart().total_items(), 1);
}

#[tokio::test]
async fn test_wrong_token_is_unauthorized() {
    let backend = kitchen().await;
    let dir = tempfile::tempdir().unwrap();
    let mut state = AppState::new(backend.config(dir.path(), Some("expired"))).unwrap();

    state.add_to_cart(&ProductId::new("kopi"), 1).await.unwrap();
    let err = state
        .checkout(details(PaymentMethod::Cod))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Backend(BackendError::Unauthorized(_))
    ));
    assert_eq!(state.cart().total_items(), 1);
}

#[tokio::test]
async fn test_empty_cart_checkout_is_rejected_locally() {
    let backend = kitchen().await;
    let dir = tempfile::tempdir().unwrap();
    let mut state = AppState::new(backend.config(dir.path(), Some(TEST_TOKEN))).unwrap();

    let err = state
        .checkout(details(PaymentMethod::Cod))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Order(OrderError::EmptyCart)));
    assert_eq!(backend.requests("/api/orders"), 0);
}

#[tokio::test]
async fn test_order_history() {
    let backend = kitchen().await;
    let dir = tempfile::tempdir().unwrap();
    let mut state = AppState::new(backend.config(dir.path(), Some(TEST_TOKEN))).unwrap();

    state.add_to_cart(&ProductId::new("kopi"), 1).await.unwrap();
    let placed = state
        .checkout(details(PaymentMethod::QrisMandiri))
        .await
        .unwrap();

    let orders = state.backend().my_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, placed.id);

    let order = state.backend().get_order(&placed.id).await.unwrap();
    assert_eq!(order, placed);
    assert_eq!(order.notes.as_deref(), Some("Pedas sedang"));
    assert!(order.created_at.is_some());

    let err = state
        .backend()
        .get_order(&OrderId::new("order-99"))
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::NotFound(_)));
}
