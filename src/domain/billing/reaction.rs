//! Reaction of an order to a payment status change.
//!
//! | payment status      | order status  | return on refund | order    | token      |
//! |---------------------|---------------|------------------|----------|------------|
//! | confirmed           | any           | any              | complete | verify     |
//! | refunded            | any           | true             | return   | keep       |
//! | waiting / input     | any           | any              | keep     | keep       |
//! | any other           | completed     | any              | keep     | keep       |
//! | any other           | not completed | any              | cancel   | invalidate |

use super::{OrderStatus, PaymentStatus};

/// What happens to the order owning the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderReaction {
    Complete,
    Return,
    Cancel,
    Keep,
}

/// What happens to the user's recurring token, if a record exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenEffect {
    Verify,
    Invalidate,
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReaction {
    pub order: OrderReaction,
    pub token: TokenEffect,
}

impl StatusReaction {
    const NONE: StatusReaction = StatusReaction {
        order: OrderReaction::Keep,
        token: TokenEffect::Keep,
    };

    pub fn is_noop(&self) -> bool {
        *self == Self::NONE
    }
}

/// Decide the reaction to `payment_status` for an order in `order_status`.
pub fn react(
    payment_status: PaymentStatus,
    order_status: OrderStatus,
    return_on_refund: bool,
) -> StatusReaction {
    match payment_status {
        PaymentStatus::Confirmed => StatusReaction {
            order: OrderReaction::Complete,
            token: TokenEffect::Verify,
        },
        PaymentStatus::Refunded if return_on_refund => StatusReaction {
            order: OrderReaction::Return,
            token: TokenEffect::Keep,
        },
        PaymentStatus::Waiting | PaymentStatus::Input => StatusReaction::NONE,
        _ if order_status == OrderStatus::Completed => StatusReaction::NONE,
        _ => StatusReaction {
            order: OrderReaction::Cancel,
            token: TokenEffect::Invalidate,
        },
    }
}
