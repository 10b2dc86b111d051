//! # Logging Listeners
//!
//! Listeners that only log what happened. Useful as a default so every
//! notification leaves a trace, and as a template for real handlers.

use payments_core::{CommonOrder, Dispatcher, Event, EventName};
use tracing::{info, warn};

/// Register a logging listener for every well-known event
pub fn register_logging_listeners(dispatcher: &Dispatcher) {
    dispatcher.listen_many(&EventName::well_known(), |gateway, event| {
        log_event(gateway.name(), event);
        Ok(())
    });
}

fn log_event(gateway: &str, event: &Event) {
    match event {
        Event::OrderCompleted { order } => {
            info!(
                "[{}] Order completed: #{} ({} {})",
                gateway,
                order.reference(),
                order.total(),
                order.currency()
            )
        }
        Event::OrderFailed { order } => {
            warn!("[{}] Order failed: #{}", gateway, order.reference())
        }
        Event::OrderRefunded { order, refund }
        | Event::OrderPartiallyRefunded { order, refund } => {
            info!(
                "[{}] {}: #{} refund {} ({} of {})",
                gateway,
                event.name(),
                order.reference(),
                refund.refund_id(),
                refund.total(),
                order.total()
            )
        }
        Event::SubscriptionActivated { subscription } => {
            info!(
                "[{}] Subscription activated: #{} ({})",
                gateway,
                subscription.reference(),
                subscription.period()
            )
        }
        Event::SubscriptionFailed { subscription } => {
            warn!("[{}] Subscription failed: #{}", gateway, subscription.reference())
        }
        Event::SubscriptionCancelled { subscription } => {
            info!("[{}] Subscription cancelled: #{}", gateway, subscription.reference())
        }
        Event::SubscriptionRebilled {
            subscription,
            rebill,
        } => {
            info!(
                "[{}] Subscription rebilled: #{} at {}",
                gateway,
                subscription.reference(),
                rebill.timestamp()
            )
        }
        Event::SubscriptionPaymentFailed {
            subscription,
            failed_payment,
        } => {
            warn!(
                "[{}] Subscription payment failed: #{} at {}",
                gateway,
                subscription.reference(),
                failed_payment.timestamp()
            )
        }
        Event::Custom { name, .. } => info!("[{}] {}", gateway, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registers_every_well_known_event() {
        let dispatcher = Dispatcher::new();
        register_logging_listeners(&dispatcher);

        for name in EventName::well_known() {
            assert_eq!(dispatcher.listener_count(&name), 1);
        }
        assert_eq!(
            dispatcher.listener_count(&EventName::Custom("on_other".to_string())),
            0
        );
    }
}
