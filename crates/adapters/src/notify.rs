// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use wfe_core::MailConfig;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("mail notification is not configured (notification.mail.server is unset)")]
    NotConfigured,
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Adapter for sending run-completion notifications.
#[async_trait]
pub trait NotifyAdapter: Send + Sync {
    /// Send a notification with a title and message body to the configured
    /// recipient(s).
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError>;
}

/// Mail notification adapter, built from `notification.mail.*` config plus
/// the `MAIL_PASSWORD` environment variable read at construction time.
pub struct MailNotifyAdapter {
    config: MailConfig,
    recipient: Mailbox,
    password: Option<String>,
}

impl MailNotifyAdapter {
    pub fn new(config: MailConfig, recipient: Mailbox, password: Option<String>) -> Self {
        Self { config, recipient, password }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
        let server = self.config.server.as_deref().ok_or(NotifyError::NotConfigured)?;
        let mut builder = if self.config.tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(server)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(server)
        }
        .map_err(|e| NotifyError::SendFailed(e.to_string()))?;

        if let Some(port) = self.config.port {
            builder = builder.port(port);
        }
        if let (Some(username), Some(password)) = (&self.config.username, &self.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        Ok(builder.build())
    }
}

#[async_trait]
impl NotifyAdapter for MailNotifyAdapter {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        let sender: Mailbox = self
            .config
            .sender
            .as_deref()
            .ok_or(NotifyError::NotConfigured)?
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::SendFailed(e.to_string()))?;

        let mut builder = Message::builder().from(sender).to(self.recipient.clone()).subject(title);
        if let Some(reply_to) = &self.config.reply_to {
            let reply_to: Mailbox = reply_to.parse().map_err(|e: lettre::address::AddressError| NotifyError::SendFailed(e.to_string()))?;
            builder = builder.reply_to(reply_to);
        }
        let email = builder.body(message.to_string()).map_err(|e| NotifyError::SendFailed(e.to_string()))?;

        let transport = self.transport()?;
        transport.send(email).await.map_err(|e| NotifyError::SendFailed(e.to_string()))?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{NotifyAdapter, NotifyError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    pub struct NotifyCall {
        pub title: String,
        pub message: String,
    }

    struct FakeNotifyState {
        calls: Vec<NotifyCall>,
    }

    #[derive(Clone)]
    pub struct FakeNotifyAdapter {
        inner: Arc<Mutex<FakeNotifyState>>,
    }

    impl Default for FakeNotifyAdapter {
        fn default() -> Self {
            Self { inner: Arc::new(Mutex::new(FakeNotifyState { calls: Vec::new() })) }
        }
    }

    impl FakeNotifyAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<NotifyCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl NotifyAdapter for FakeNotifyAdapter {
        async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
            self.inner.lock().calls.push(NotifyCall { title: title.to_string(), message: message.to_string() });
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifyAdapter, NotifyCall};

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
