//! Email campaign pipeline.
//!
//! A [`CampaignDefinition`] bundles three ordered extension points:
//!
//! - **recipient filters** narrow the candidate set; they are folded left to
//!   right, each one receiving the previous filter's output;
//! - **before-send hooks** gate sending; they are AND-ed with
//!   short-circuit, so the first rejection stops evaluation;
//! - **after-send hooks** observe a send attempt; all of them run, in order.
//!
//! Definitions are built once per campaign kind and shared read-only.

use std::fmt;

use serde::Serialize;

use crate::activity::ActivityEvent;
use crate::types::Timestamp;

/// Context handed to filters and before-send hooks.
#[derive(Debug, Clone, Copy)]
pub struct SendContext<'a> {
    /// The triggering activity, absent for scheduled campaigns.
    pub activity: Option<&'a ActivityEvent>,
    pub time: Timestamp,
}

/// Outcome of one send attempt, handed to after-send hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReport {
    pub campaign: String,
    pub recipients: usize,
    pub delivered: usize,
    pub failed: usize,
}

pub type RecipientFilter<S> = Box<dyn Fn(S, &SendContext<'_>) -> S + Send + Sync>;
pub type BeforeSendHook = Box<dyn Fn(&SendContext<'_>) -> bool + Send + Sync>;
pub type AfterSendHook = Box<dyn Fn(&SendReport) + Send + Sync>;

/// A campaign kind's filters and hooks, generic over the recipient scope `S`.
pub struct CampaignDefinition<S> {
    name: String,
    recipient_filters: Vec<RecipientFilter<S>>,
    before_send_hooks: Vec<BeforeSendHook>,
    after_send_hooks: Vec<AfterSendHook>,
}

impl<S> CampaignDefinition<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            recipient_filters: Vec::new(),
            before_send_hooks: Vec::new(),
            after_send_hooks: Vec::new(),
        }
    }

    /// Append a recipient filter.
    pub fn recipient_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(S, &SendContext<'_>) -> S + Send + Sync + 'static,
    {
        self.recipient_filters.push(Box::new(filter));
        self
    }

    /// Append a before-send hook.
    pub fn before_send<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SendContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.before_send_hooks.push(Box::new(hook));
        self
    }

    /// Append an after-send hook.
    pub fn after_send<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SendReport) + Send + Sync + 'static,
    {
        self.after_send_hooks.push(Box::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fold `scope` through every filter in declaration order.
    pub fn apply_recipient_filters(&self, scope: S, ctx: &SendContext<'_>) -> S {
        self.recipient_filters
            .iter()
            .fold(scope, |scope, filter| filter(scope, ctx))
    }

    /// `true` only if every hook accepts. Stops at the first rejection.
    pub fn run_before_send_hooks(&self, ctx: &SendContext<'_>) -> bool {
        self.before_send_hooks.iter().all(|hook| hook(ctx))
    }

    /// Run every after-send hook once, in order.
    pub fn run_after_send_hooks(&self, report: &SendReport) {
        for hook in &self.after_send_hooks {
            hook(report);
        }
    }
}

impl<S> fmt::Debug for CampaignDefinition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CampaignDefinition")
            .field("name", &self.name)
            .field("recipient_filters", &self.recipient_filters.len())
            .field("before_send_hooks", &self.before_send_hooks.len())
            .field("after_send_hooks", &self.after_send_hooks.len())
            .finish()
    }
}

/// Snake-case campaign name from a type-style name (`AssigneeDigest` ->
/// `assignee_digest`).
pub fn campaign_name(type_name: &str) -> String {
    let mut name = String::with_capacity(type_name.len() + 4);
    for (i, c) in type_name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                name.push('_');
            }
            name.extend(c.to_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    fn ctx() -> SendContext<'static> {
        SendContext {
            activity: None,
            time: chrono::Utc::now(),
        }
    }

    fn report() -> SendReport {
        SendReport {
            campaign: "test".to_string(),
            recipients: 2,
            delivered: 1,
            failed: 1,
        }
    }

    #[test]
    fn filters_apply_in_declaration_order_on_previous_output() {
        let seen: Arc<Mutex<Vec<(&'static str, Vec<u32>)>>> = Arc::default();
        let (s1, s2, s3) = (seen.clone(), seen.clone(), seen.clone());

        let campaign = CampaignDefinition::<Vec<u32>>::new("ordered")
            .recipient_filter(move |scope, _| {
                s1.lock().unwrap().push(("f1", scope.clone()));
                scope.into_iter().filter(|n| n % 2 == 0).collect()
            })
            .recipient_filter(move |scope, _| {
                s2.lock().unwrap().push(("f2", scope.clone()));
                scope.into_iter().filter(|n| *n > 2).collect()
            })
            .recipient_filter(move |scope, _| {
                s3.lock().unwrap().push(("f3", scope.clone()));
                scope.into_iter().filter(|n| *n != 6).collect()
            });

        let result = campaign.apply_recipient_filters((1..=8).collect(), &ctx());
        assert_eq!(result, vec![4, 8]);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("f1", vec![1, 2, 3, 4, 5, 6, 7, 8]),
                ("f2", vec![2, 4, 6, 8]),
                ("f3", vec![4, 6, 8]),
            ]
        );
    }

    #[test]
    fn no_filters_returns_the_full_scope() {
        let campaign = CampaignDefinition::<Vec<u32>>::new("open");
        assert_eq!(campaign.apply_recipient_filters(vec![1, 2], &ctx()), vec![1, 2]);
    }

    #[test]
    fn before_send_hooks_short_circuit_on_first_rejection() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (c1, c2, c3) = (calls.clone(), calls.clone(), calls.clone());

        let campaign = CampaignDefinition::<()>::new("gated")
            .before_send(move |_| {
                c1.fetch_add(1, Ordering::SeqCst);
                true
            })
            .before_send(move |_| {
                c2.fetch_add(1, Ordering::SeqCst);
                false
            })
            .before_send(move |_| {
                c3.fetch_add(100, Ordering::SeqCst);
                true
            });

        assert!(!campaign.run_before_send_hooks(&ctx()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn before_send_hooks_pass_when_all_accept_or_none_exist() {
        let campaign = CampaignDefinition::<()>::new("open").before_send(|_| true);
        assert!(campaign.run_before_send_hooks(&ctx()));
        assert!(CampaignDefinition::<()>::new("bare").run_before_send_hooks(&ctx()));
    }

    #[test]
    fn after_send_hooks_all_run_once_in_order() {
        let order: Arc<Mutex<Vec<u8>>> = Arc::default();
        let (o1, o2, o3) = (order.clone(), order.clone(), order.clone());

        let campaign = CampaignDefinition::<()>::new("logged")
            .before_send(|_| false)
            .after_send(move |_| o1.lock().unwrap().push(1))
            .after_send(move |r| {
                assert_eq!(r.failed, 1);
                o2.lock().unwrap().push(2)
            })
            .after_send(move |_| o3.lock().unwrap().push(3));

        campaign.run_after_send_hooks(&report());
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn campaign_name_is_snake_case() {
        assert_eq!(campaign_name("AssigneeDigest"), "assignee_digest");
        assert_eq!(campaign_name("InviteReminder"), "invite_reminder");
        assert_eq!(campaign_name("digest"), "digest");
    }
}
