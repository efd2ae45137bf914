//! Message broker client
//!
//! Owns the single connection to the broker. Declares `judge_queue`, caps
//! in-flight deliveries at the executor pool size via prefetch, and hands
//! every delivery to the work loop. Deliveries are acknowledged only after
//! the judge task completes, so a crashed worker loses nothing: the broker
//! redelivers everything unacked once the channel dies.

use std::time::Duration;

use futures::StreamExt;
use lapin::{
    Connection, ConnectionProperties,
    options::{BasicConsumeOptions, BasicPublishOptions, BasicQosOptions, QueueDeclareOptions},
    types::FieldTable,
};
use rand::Rng;

use crate::{
    broker::message::JudgeRequest,
    constants::{CONSUMER_TAG, JUDGE_QUEUE, RECONNECT_DELAY_MAX_SECS, RECONNECT_DELAY_MIN_SECS},
    error::WorkerResult,
    worker::{WorkerContext, work_loop},
};

/// Broker client for the judge queue
pub struct BrokerClient {
    url: String,
    prefetch: u16,
}

impl BrokerClient {
    /// Create a new broker client; `prefetch` should equal the executor
    /// pool size so the broker never over-delivers
    pub fn new(url: String, prefetch: u16) -> Self {
        Self { url, prefetch }
    }

    /// Consume `judge_queue` forever.
    ///
    /// Every failure mode (connect error, consume error, unsolicited
    /// close) falls back to a full reinitialization after a randomized
    /// delay. Unacked deliveries are redelivered by the broker.
    pub async fn run(&self, ctx: WorkerContext) {
        loop {
            match self.consume(&ctx).await {
                Ok(()) => tracing::warn!("broker consumer stream ended, reconnecting"),
                Err(e) => tracing::warn!("broker connection failed: {}", e),
            }
            let delay = {
                let mut rng = rand::rng();
                rng.random_range(RECONNECT_DELAY_MIN_SECS..=RECONNECT_DELAY_MAX_SECS)
            };
            tokio::time::sleep(Duration::from_secs_f64(delay)).await;
        }
    }

    async fn consume(&self, ctx: &WorkerContext) -> WorkerResult<()> {
        let connection =
            Connection::connect(&self.url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        channel
            .queue_declare(
                JUDGE_QUEUE,
                QueueDeclareOptions::default(),
                FieldTable::default(),
            )
            .await?;
        channel
            .basic_qos(self.prefetch, BasicQosOptions::default())
            .await?;

        let mut consumer = channel
            .basic_consume(
                JUDGE_QUEUE,
                CONSUMER_TAG,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        tracing::info!("consuming {} (prefetch {})", JUDGE_QUEUE, self.prefetch);

        while let Some(delivery) = consumer.next().await {
            let delivery = delivery?;
            work_loop::handle_delivery(ctx, delivery).await;
        }

        Ok(())
    }

    /// Publish a judge request to the queue.
    ///
    /// This is the producer side of the contract; the HTTP API uses the
    /// same body format. Exposed here for tooling and tests.
    pub async fn publish(&self, request: &JudgeRequest) -> WorkerResult<()> {
        let connection =
            Connection::connect(&self.url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;
        channel
            .queue_declare(
                JUDGE_QUEUE,
                QueueDeclareOptions::default(),
                FieldTable::default(),
            )
            .await?;
        channel
            .basic_publish(
                "",
                JUDGE_QUEUE,
                BasicPublishOptions::default(),
                &request.encode()?,
                lapin::BasicProperties::default(),
            )
            .await?;
        Ok(())
    }
}
