//! Turns a cart plus a shipping form into a persisted order.
//!
//! A submission walks `Idle → Validating → Submitting → Succeeded | Failed`.
//! Persistence is two dependent writes (order row, then its item rows) with no
//! transaction around them: if the item insert fails the order row stays behind
//! as `pending` with no items and has to be reconciled by an operator.

pub mod validation;

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    api::checkout_webhook::{
        CheckoutNotification, NotificationCustomer, NotificationItem, OrderNotifier,
    },
    cart::{CartItem, CartStorage, CartStore},
    models::{CreateOrderEntity, CreateOrderItemEntity, OrderEntity},
    navigation::Route,
    orders::OrderStatus,
    store::{OrderStore, StoreError},
};

pub use validation::{CheckoutForm, ShippingDetails, ValidationError, validate};

/// Where a checkout submission currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded { order_id: Uuid },
    Failed { message: String },
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty. Add products before checking out.")]
    EmptyCart,
    #[error("{0}")]
    Invalid(#[from] ValidationError),
    #[error("cart line {id} has a quantity too large to order")]
    QuantityOverflow { id: String },
    #[error("failed to create order: {0}")]
    OrderInsert(#[source] StoreError),
    #[error("order {order_id} was created but its items were not: {source}")]
    ItemsInsert {
        order_id: Uuid,
        #[source]
        source: StoreError,
    },
}

impl CheckoutError {
    /// Text safe to show the shopper.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::EmptyCart | CheckoutError::Invalid(_) => self.to_string(),
            CheckoutError::QuantityOverflow { .. }
            | CheckoutError::OrderInsert(_)
            | CheckoutError::ItemsInsert { .. } => {
                "We could not process your order. Please try again later.".to_owned()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CheckoutReceipt {
    pub order_id: Uuid,
    pub total: Decimal,
    /// Path of the confirmation view to show next.
    pub redirect_to: String,
}

pub struct CheckoutSubmitter {
    orders: Arc<dyn OrderStore>,
    notifier: Arc<dyn OrderNotifier>,
    state: CheckoutState,
}

impl CheckoutSubmitter {
    pub fn new(orders: Arc<dyn OrderStore>, notifier: Arc<dyn OrderNotifier>) -> Self {
        Self {
            orders,
            notifier,
            state: CheckoutState::Idle,
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Validates `form`, writes the order and its items, then empties `cart`.
    ///
    /// On any failure the cart is left untouched and the form is only borrowed,
    /// so the caller still holds everything the shopper entered.
    pub async fn submit<S: CartStorage>(
        &mut self,
        cart: &mut CartStore<S>,
        form: &CheckoutForm,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let result = self.run(cart, form).await;
        self.state = match &result {
            Ok(receipt) => CheckoutState::Succeeded {
                order_id: receipt.order_id,
            },
            Err(err) => CheckoutState::Failed {
                message: err.user_message(),
            },
        };
        result
    }

    async fn run<S: CartStorage>(
        &mut self,
        cart: &mut CartStore<S>,
        form: &CheckoutForm,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        self.state = CheckoutState::Validating;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let details = validate(form)?;
        let lines = cart.items().to_vec();
        let quantities = lines
            .iter()
            .map(|line| {
                i32::try_from(line.quantity).map_err(|_| CheckoutError::QuantityOverflow {
                    id: line.id.clone(),
                })
            })
            .collect::<Result<Vec<i32>, _>>()?;
        let total = cart.total_price();

        self.state = CheckoutState::Submitting;
        let order = self
            .orders
            .insert_order(new_order(&details, total))
            .await
            .map_err(|err| {
                error!(error = %err, "Failed to create order");
                CheckoutError::OrderInsert(err)
            })?;

        let items = lines
            .iter()
            .zip(quantities)
            .map(|(line, quantity)| CreateOrderItemEntity {
                order_id: order.id,
                product_id: line.id.clone(),
                product_name: line.name.clone(),
                price: line.price,
                quantity,
                size: line.size.clone(),
            })
            .collect();
        if let Err(source) = self.orders.insert_order_items(items).await {
            error!(
                order_id = %order.id,
                error = %source,
                "Order left pending without items, needs manual reconciliation"
            );
            return Err(CheckoutError::ItemsInsert {
                order_id: order.id,
                source,
            });
        }
        info!(order_id = %order.id, lines = lines.len(), %total, "Order created");

        self.notifier.notify(notification(&order, &details, &lines));

        if let Err(err) = cart.clear() {
            warn!(order_id = %order.id, error = %err, "Order placed but cart could not be cleared");
        }

        Ok(CheckoutReceipt {
            order_id: order.id,
            total: order.total,
            redirect_to: Route::OrderSuccess { order_id: order.id }.path(),
        })
    }
}

fn new_order(details: &ShippingDetails, total: Decimal) -> CreateOrderEntity {
    CreateOrderEntity {
        customer_name: details.name.clone(),
        customer_email: details.email.clone(),
        customer_phone: details.phone.clone(),
        address: details.address.clone(),
        city: details.city.clone(),
        state: details.state.clone(),
        zip_code: details.zip_code.clone(),
        total,
        status: OrderStatus::Pending,
    }
}

fn notification(
    order: &OrderEntity,
    details: &ShippingDetails,
    lines: &[CartItem],
) -> CheckoutNotification {
    CheckoutNotification {
        order_id: order.id,
        customer: NotificationCustomer {
            name: details.name.clone(),
            email: details.email.clone(),
            phone: details.phone.clone(),
            address: details.address.clone(),
            city: details.city.clone(),
            state: details.state.clone(),
            zip_code: details.zip_code.clone(),
        },
        items: lines
            .iter()
            .map(|line| NotificationItem {
                id: line.id.clone(),
                name: line.name.clone(),
                price: line.price,
                quantity: line.quantity,
                size: line.size.clone(),
            })
            .collect(),
        total: order.total,
        created_at: order.created_at,
    }
}
