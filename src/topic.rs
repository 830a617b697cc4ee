//! Topic provisioning against the Kafka cluster.

use crate::error::ProducerError;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::ClientConfig;
use std::time::Duration;
use tracing::info;

const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

/// Ensures the destination topic exists before production begins.
///
/// `exists` is a metadata query with no side effects; `create` is issued only
/// when the topic is absent. Two producers racing on the same missing topic
/// are expected: the cluster rejects the loser with "already exists", which
/// is success here, not a startup failure.
pub struct TopicProvisioner {
    admin: AdminClient<DefaultClientContext>,
    partitions: i32,
    replication: i32,
}

impl TopicProvisioner {
    pub fn new(broker: &str, partitions: i32, replication: i32) -> Result<Self, ProducerError> {
        let admin: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", broker)
            .create()?;

        Ok(Self {
            admin,
            partitions,
            replication,
        })
    }

    /// Whether the topic is present in cluster metadata.
    pub fn exists(&self, topic: &str) -> Result<bool, ProducerError> {
        let metadata = self
            .admin
            .inner()
            .fetch_metadata(Some(topic), METADATA_TIMEOUT)?;

        Ok(metadata
            .topics()
            .iter()
            .any(|t| t.name() == topic && t.error().is_none()))
    }

    /// Request creation with the deployment's partition/replication policy.
    pub async fn create(&self, topic: &str) -> Result<(), ProducerError> {
        let new_topic = NewTopic::new(topic, self.partitions, TopicReplication::Fixed(self.replication));
        let opts = AdminOptions::new().operation_timeout(Some(METADATA_TIMEOUT));

        match self.admin.create_topics(&[new_topic], &opts).await {
            Ok(results) => {
                for result in results {
                    match result {
                        Ok(topic_name) => {
                            info!("Topic '{topic_name}' created successfully");
                        }
                        Err((topic_name, err)) => {
                            let err_str = err.to_string();
                            if err_str.contains("already exists")
                                || err_str.contains("TopicExistsException")
                            {
                                info!("Topic '{topic_name}' already exists");
                            } else {
                                return Err(ProducerError::TopicCreation(format!(
                                    "Failed to create topic {topic_name}: {err}"
                                )));
                            }
                        }
                    }
                }
            }
            Err(e) => {
                return Err(ProducerError::TopicCreation(format!(
                    "Failed to create topic: {e}"
                )));
            }
        }

        Ok(())
    }

    /// Provision the topic once, at startup.
    pub async fn ensure(&self, topic: &str) -> Result<(), ProducerError> {
        if self.exists(topic)? {
            info!("Topic '{topic}' exists, skipping creation");
            return Ok(());
        }
        self.create(topic).await
    }
}
