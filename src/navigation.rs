//! Storefront views a shopper can be sent to.

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Product { id: String },
    Checkout,
    OrderSuccess { order_id: Uuid },
    Auth,
    AdminDashboard,
    AdminProducts,
    AdminOrders,
}

impl Route {
    /// The confirmation view needs an order id; without one the shopper goes home.
    pub fn order_success(order_id: Option<Uuid>) -> Route {
        match order_id {
            Some(order_id) => Route::OrderSuccess { order_id },
            None => Route::Home,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_owned(),
            Route::Product { id } => format!("/product/{id}"),
            Route::Checkout => "/checkout".to_owned(),
            Route::OrderSuccess { order_id } => format!("/checkout/success?order_id={order_id}"),
            Route::Auth => "/auth".to_owned(),
            Route::AdminDashboard => "/admin".to_owned(),
            Route::AdminProducts => "/admin/products".to_owned(),
            Route::AdminOrders => "/admin/orders".to_owned(),
        }
    }
}
