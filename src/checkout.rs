//! Checkout.
//!
//! A single checkout attempt walks
//! `Idle -> AwaitingProfile | OrderPending -> PaymentPending -> Complete | Failed`.
//! Order creation and payment are two sequential calls, mirroring the
//! order service's reserve-then-charge split; a failure between them
//! leaves an order row without a completed payment, which the backend
//! reconciles out-of-band. The cart is cleared exactly once, on a
//! confirmed payment, and left intact on every failure path so the user
//! can retry.

use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::{
    gateway::{GatewayError, OrderGateway, OrderLine, OrderRequest, PaymentMethod, PaymentRequest},
    manager::CartManager,
    storage::{SessionStore, StoreError},
};

/// States of a single checkout attempt.
///
/// `Failed` and `Complete` are terminal per attempt; every new call to
/// [`CheckoutService::checkout`] restarts from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    /// Default state on entry.
    Idle,

    /// No profile reference exists; profile capture must run first.
    AwaitingProfile,

    /// Order-creation request in flight.
    OrderPending,

    /// Payment request in flight.
    PaymentPending,

    /// Payment confirmed and cart cleared.
    Complete,

    /// The attempt failed; the cart is intact.
    Failed,
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingProfile => "awaiting_profile",
            Self::OrderPending => "order_pending",
            Self::PaymentPending => "payment_pending",
            Self::Complete => "complete",
            Self::Failed => "failed",
        };

        f.write_str(name)
    }
}

/// How a checkout attempt concluded without failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// No profile reference was present. No network call was made and
    /// the cart is untouched; the caller should invoke profile capture
    /// and re-enter checkout afterwards.
    ProfileRequired,

    /// Payment confirmed. The cart has been cleared.
    Completed {
        /// The identifier assigned by the order service at creation.
        order_id: String,
    },
}

/// Ways a checkout attempt can fail. The cart is never cleared on any
/// of these.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Another checkout is already in flight; this one was rejected,
    /// not queued.
    #[error("checkout already in progress")]
    AlreadyInProgress,

    /// There is nothing to order.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// The order service declined to create the order.
    #[error("order rejected: {reason}")]
    OrderRejected {
        /// Reason reported by the order service.
        reason: String,
    },

    /// The order service claimed success but supplied no order id;
    /// treated as a failure, not silently ignored.
    #[error("order response did not include an order id")]
    MissingOrderId,

    /// The payment was declined. The backend order row may be left
    /// pending; reconciling it is a backend concern.
    #[error("payment for order {order_id} rejected: {reason}")]
    PaymentRejected {
        /// The order whose payment failed.
        order_id: String,
        /// Reason reported by the payment service.
        reason: String,
    },

    /// Transport-level failure, including request timeouts.
    #[error("order service unreachable")]
    Gateway(#[from] GatewayError),

    /// Session storage could not be read or written.
    #[error("session storage error")]
    Storage(#[from] StoreError),
}

/// Drives checkout attempts against an order gateway.
///
/// At most one attempt may be in flight at a time; a concurrent call is
/// rejected with [`CheckoutError::AlreadyInProgress`] rather than
/// submitting a duplicate order.
#[derive(Debug)]
pub struct CheckoutService<G> {
    gateway: G,
    in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<G: OrderGateway> CheckoutService<G> {
    /// Create a service over the given gateway.
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run one checkout attempt over the current cart.
    ///
    /// The order amount and line snapshot are pinned before the first
    /// network call and passed through to the payment step unchanged, so
    /// the two requests can never disagree about what is being bought.
    ///
    /// # Errors
    ///
    /// Any [`CheckoutError`] is a `Failed` terminal state for this
    /// attempt; the cart is left intact for a user-initiated retry.
    #[instrument(skip(self, manager), fields(lines = manager.cart().len()))]
    pub async fn checkout<S: SessionStore>(
        &self,
        manager: &mut CartManager<S>,
        method: PaymentMethod,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let _guard = self.begin()?;

        debug!(state = %CheckoutState::Idle, "checkout started");

        let Some(user_id) = manager.profile_reference()? else {
            debug!(state = %CheckoutState::AwaitingProfile, "no profile reference");
            return Ok(CheckoutOutcome::ProfileRequired);
        };

        if manager.cart().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // Pinned for both calls.
        let items: Vec<OrderLine> = manager.lines().iter().map(OrderLine::from).collect();
        let total_amount = manager.total();

        debug!(state = %CheckoutState::OrderPending, total_amount, "creating order");

        let order = self
            .gateway
            .create_order(OrderRequest {
                user_id: user_id.clone(),
                items: items.clone(),
                total_amount,
                payment_method: method,
            })
            .await?;

        if !order.is_ok() {
            let reason = order
                .error
                .unwrap_or_else(|| format!("order service returned status {:?}", order.status));

            warn!(state = %CheckoutState::Failed, %reason, "order rejected");

            return Err(CheckoutError::OrderRejected { reason });
        }

        let order_id = order
            .order_id
            .filter(|id| !id.is_empty())
            .ok_or(CheckoutError::MissingOrderId)?;

        debug!(state = %CheckoutState::PaymentPending, %order_id, "submitting payment");

        let payment = self
            .gateway
            .submit_payment(PaymentRequest {
                order_id: order_id.clone(),
                user_id,
                amount: total_amount,
                method,
                items,
            })
            .await?;

        if !payment.is_ok() {
            let reason = payment
                .error
                .unwrap_or_else(|| format!("payment service returned status {:?}", payment.status));

            warn!(state = %CheckoutState::Failed, %order_id, %reason, "payment rejected");

            return Err(CheckoutError::PaymentRejected { order_id, reason });
        }

        manager.clear()?;

        info!(state = %CheckoutState::Complete, %order_id, "checkout complete");

        Ok(CheckoutOutcome::Completed { order_id })
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, CheckoutError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_err()
        {
            return Err(CheckoutError::AlreadyInProgress);
        }

        Ok(InFlightGuard(&self.in_flight))
    }
}
