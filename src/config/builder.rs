//! Builder for `BridgeConfig`

use crate::error::Result;
use crate::transport::NickCollisionPolicy;

use super::BridgeConfig;

/// Builder for `BridgeConfig`
#[derive(Debug, Default)]
pub struct BridgeConfigBuilder {
    config: BridgeConfig,
}

impl BridgeConfigBuilder {
    /// Set server address and port
    #[must_use]
    pub fn server(mut self, address: impl Into<String>, port: u16) -> Self {
        self.config.server.address = address.into();
        self.config.server.port = port;
        self
    }

    /// Set server password
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.server.password = Some(password.into());
        self
    }

    /// Set WEBIRC password
    #[must_use]
    pub fn webirc_password(mut self, password: impl Into<String>) -> Self {
        self.config.server.webirc_password = Some(password.into());
        self
    }

    /// Enable TLS, optionally trusting any certificate
    #[must_use]
    pub const fn tls(mut self, trust_all: bool) -> Self {
        self.config.server.ssl.enabled = true;
        self.config.server.ssl.trust = trust_all;
        self
    }

    /// Set max nick length
    #[must_use]
    pub const fn nick_size(mut self, size: usize) -> Self {
        self.config.server.nicksize = size;
        self
    }

    /// Set nick prefix and suffix
    #[must_use]
    pub fn nick_decoration(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.config.defaults.prefix = prefix.into();
        self.config.defaults.suffix = suffix.into();
        self
    }

    /// Add an auto-join channel
    #[must_use]
    pub fn add_channel(mut self, channel: impl Into<String>) -> Self {
        self.config.channels.push(channel.into());
        self
    }

    /// Set the user list template
    #[must_use]
    pub fn list_template(mut self, template: impl Into<String>) -> Self {
        self.config.messages.list = template.into();
        self
    }

    /// Set the action confirmation template
    #[must_use]
    pub fn action_template(mut self, template: impl Into<String>) -> Self {
        self.config.messages.action = template.into();
        self
    }

    /// Set the topic template
    #[must_use]
    pub fn topic_template(mut self, template: impl Into<String>) -> Self {
        self.config.messages.topic = template.into();
        self
    }

    /// Set the inbound message template
    #[must_use]
    pub fn message_template(mut self, template: impl Into<String>) -> Self {
        self.config.messages.message = template.into();
        self
    }

    /// Add an action translation
    #[must_use]
    pub fn translation(mut self, phrase: impl Into<String>, translated: impl Into<String>) -> Self {
        self.config
            .translations
            .insert(phrase.into(), translated.into());
        self
    }

    /// Set verbose protocol logging
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Set connect timeout in seconds
    #[must_use]
    pub const fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeouts.connect_secs = secs;
        self
    }

    /// Set reply expectation lifetime in seconds
    #[must_use]
    pub const fn reply_timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeouts.reply_secs = secs;
        self
    }

    /// Set nick collision policy
    #[must_use]
    pub const fn nick_collision(mut self, policy: NickCollisionPolicy) -> Self {
        self.config.nick_collision = policy;
        self
    }

    /// Set connect worker pool size
    #[must_use]
    pub const fn max_concurrent_connects(mut self, n: usize) -> Self {
        self.config.max_concurrent_connects = n;
        self
    }

    /// Build the configuration without validating it
    #[must_use]
    pub fn build(self) -> BridgeConfig {
        self.config
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// Returns `InvalidConfig` if validation fails
    pub fn try_build(self) -> Result<BridgeConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
