// NATS bindings for device shadows and the access controller

mod client;
mod publisher;
mod subjects;
mod subscriber;

pub use client::{NatsClient, NatsConfig};
pub use publisher::{DesiredStatePublisher, NatsVerdictPublisher};
pub use subjects::{delta_subject, thing_from_subject};
pub use subscriber::{
    run_card_check_subscriber, run_documents_subscriber, run_reported_subscriber,
};
