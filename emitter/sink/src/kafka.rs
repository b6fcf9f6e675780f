use {
    crate::{BusMessage, EmitterConfig, MessageBus, Result, SinkError},
    async_trait::async_trait,
    futures::future::try_join_all,
    rdkafka::{
        config::ClientConfig,
        message::{Header, OwnedHeaders},
        producer::{FutureProducer, FutureRecord},
    },
};

/// Largest batch the producer assembles, in bytes.
pub const MAX_BATCH_BYTES: usize = 512_000_000;

/// Kafka producer over SASL_SSL with the PLAIN mechanism.
pub struct KafkaBus {
    producer: FutureProducer,
    topic: String,
}

impl KafkaBus {
    pub fn new(config: &EmitterConfig) -> Result<Self> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", &config.kafka_bootstrap_server)
            .set("security.protocol", "SASL_SSL")
            .set("sasl.mechanisms", "PLAIN")
            .set("sasl.username", &config.kafka_api_key)
            .set("sasl.password", &config.kafka_api_secret)
            .set("socket.connection.setup.timeout.ms", "10000")
            .set("linger.ms", "1")
            .set("batch.size", MAX_BATCH_BYTES.to_string())
            .set("message.max.bytes", MAX_BATCH_BYTES.to_string())
            .create()
            .map_err(|err| SinkError::Bus(err.to_string()))?;

        Ok(Self {
            producer,
            topic: config.messages_topic.clone(),
        })
    }
}

#[async_trait]
impl MessageBus for KafkaBus {
    async fn publish(&self, messages: Vec<BusMessage>) -> Result<()> {
        // Enqueue everything first so the producer keeps submission order,
        // then wait for every delivery report.
        let mut deliveries = Vec::with_capacity(messages.len());
        for message in &messages {
            let headers = message
                .headers
                .iter()
                .fold(OwnedHeaders::new(), |headers, (key, value)| {
                    headers.insert(Header {
                        key: key.as_str(),
                        value: Some(value.as_str()),
                    })
                });

            let record = FutureRecord::to(&self.topic)
                .key(&message.key)
                .payload(&message.value)
                .headers(headers);

            let delivery = self
                .producer
                .send_result(record)
                .map_err(|(err, _)| SinkError::Bus(err.to_string()))?;

            deliveries.push(async move {
                match delivery.await {
                    Ok(Ok(_)) => Ok(()),
                    Ok(Err((err, _))) => Err(SinkError::Bus(err.to_string())),
                    Err(_) => Err(SinkError::Bus("delivery canceled".to_string())),
                }
            });
        }

        try_join_all(deliveries).await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(topic = %self.topic, total = messages.len(), "Delivered batch");

        Ok(())
    }
}
