//! Deferred templates: literal text interleaved with value providers.
//!
//! A [`ReferenceExpression`] never holds resolved values. Providers are asked for their
//! value on every [`ReferenceExpression::get_value`] call, so an endpoint allocated after
//! registration or a parameter read from secrets is picked up when the expression runs.

use crate::error::HostingError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A named placeholder that can be rendered as text or resolved to a value.
#[async_trait]
pub trait ValueProvider: Send + Sync {
    /// Placeholder text used in manifests, e.g. `{firebird.bindings.tcp.host}`.
    fn value_expression(&self) -> String;

    /// `Ok(None)` means the value is not available yet.
    async fn get_value(&self, cancel: &CancellationToken) -> Result<Option<String>, HostingError>;
}

#[derive(Clone)]
enum Part {
    Literal(String),
    Value(Arc<dyn ValueProvider>),
}

#[derive(Clone, Default)]
pub struct ReferenceExpression {
    parts: Vec<Part>,
}

impl ReferenceExpression {
    pub fn builder() -> ReferenceExpressionBuilder {
        ReferenceExpressionBuilder::default()
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Self::builder().literal(text).build()
    }

    pub fn value(provider: Arc<dyn ValueProvider>) -> Self {
        Self::builder().value(provider).build()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn value_expression(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(s) => out.push_str(s),
                Part::Value(provider) => out.push_str(&provider.value_expression()),
            }
        }
        out
    }

    /// Resolve every part in order. Any absent part makes the whole value absent.
    pub async fn get_value(&self, cancel: &CancellationToken) -> Result<Option<String>, HostingError> {
        self.resolve(cancel).await
    }

    async fn resolve(&self, cancel: &CancellationToken) -> Result<Option<String>, HostingError> {
        if cancel.is_cancelled() {
            return Err(HostingError::Cancelled);
        }
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(s) => out.push_str(s),
                Part::Value(provider) => {
                    let value = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(HostingError::Cancelled),
                        value = provider.get_value(cancel) => value?,
                    };
                    match value {
                        Some(v) => out.push_str(&v),
                        None => return Ok(None),
                    }
                }
            }
        }
        Ok(Some(out))
    }
}

impl fmt::Debug for ReferenceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReferenceExpression")
            .field(&self.value_expression())
            .finish()
    }
}

#[async_trait]
impl ValueProvider for ReferenceExpression {
    fn value_expression(&self) -> String {
        ReferenceExpression::value_expression(self)
    }

    async fn get_value(&self, cancel: &CancellationToken) -> Result<Option<String>, HostingError> {
        self.resolve(cancel).await
    }
}

#[derive(Default)]
pub struct ReferenceExpressionBuilder {
    parts: Vec<Part>,
}

impl ReferenceExpressionBuilder {
    pub fn literal(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return self;
        }
        match self.parts.last_mut() {
            Some(Part::Literal(prev)) => prev.push_str(&text),
            _ => self.parts.push(Part::Literal(text)),
        }
        self
    }

    pub fn value(mut self, provider: Arc<dyn ValueProvider>) -> Self {
        self.parts.push(Part::Value(provider));
        self
    }

    /// Splice another expression's parts in place, keeping them deferred.
    pub fn expression(mut self, expression: &ReferenceExpression) -> Self {
        for part in &expression.parts {
            self = match part {
                Part::Literal(s) => self.literal(s.clone()),
                Part::Value(provider) => self.value(provider.clone()),
            };
        }
        self
    }

    pub fn build(self) -> ReferenceExpression {
        ReferenceExpression { parts: self.parts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
        value: Option<&'static str>,
    }

    #[async_trait]
    impl ValueProvider for Counting {
        fn value_expression(&self) -> String {
            "{counter.value}".into()
        }

        async fn get_value(&self, _cancel: &CancellationToken) -> Result<Option<String>, HostingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.value.map(String::from))
        }
    }

    struct Pending;

    #[async_trait]
    impl ValueProvider for Pending {
        fn value_expression(&self) -> String {
            "{pending.value}".into()
        }

        async fn get_value(&self, _cancel: &CancellationToken) -> Result<Option<String>, HostingError> {
            futures::future::pending::<()>().await;
            Ok(None)
        }
    }

    #[tokio::test]
    async fn resolves_on_every_call() {
        let counter = Arc::new(Counting { calls: AtomicUsize::new(0), value: Some("42") });
        let expr = ReferenceExpression::builder()
            .literal("n=")
            .value(counter.clone())
            .literal(";")
            .build();

        assert_eq!(expr.value_expression(), "n={counter.value};");
        let token = CancellationToken::new();
        assert_eq!(expr.get_value(&token).await.unwrap().as_deref(), Some("n=42;"));
        assert_eq!(expr.get_value(&token).await.unwrap().as_deref(), Some("n=42;"));
        assert_eq!(counter.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn absent_part_makes_whole_value_absent() {
        let missing = Arc::new(Counting { calls: AtomicUsize::new(0), value: None });
        let inner = ReferenceExpression::value(missing);
        let outer = ReferenceExpression::builder()
            .value(Arc::new(inner))
            .literal(";Database=x")
            .build();

        assert_eq!(outer.value_expression(), "{counter.value};Database=x");
        assert_eq!(outer.get_value(&CancellationToken::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn cancellation_aborts_pending_resolution() {
        let expr = ReferenceExpression::builder()
            .literal("x=")
            .value(Arc::new(Pending))
            .build();
        let token = CancellationToken::new();
        let child = token.clone();
        let task = tokio::spawn(async move { expr.get_value(&child).await });
        token.cancel();
        let result = task.await.unwrap();
        assert!(matches!(result, Err(HostingError::Cancelled)));
    }

    #[test]
    fn adjacent_literals_are_merged() {
        let expr = ReferenceExpression::builder().literal("a").literal("").literal("b").build();
        assert_eq!(expr.parts.len(), 1);
        assert_eq!(expr.value_expression(), "ab");
    }
}
