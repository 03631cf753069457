use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use tokio_util::sync::CancellationToken;

use crate::{
    accrual::{AccrualClient, AccrualClientError, AccrualResponse, AccrualStatus},
    db_types::{Money, OrderId},
};

/// One canned answer of a [`ScriptedAccrualClient`].
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Status(AccrualStatus, Option<Money>),
    Fail(u16),
    /// Wait, then answer with the given status.
    Slow(Duration, AccrualStatus, Option<Money>),
    Panic,
}

/// An accrual client that answers from a script, one reply per order per call. Orders without a scripted reply get
/// `REGISTERED`.
#[derive(Debug, Default)]
pub struct ScriptedAccrualClient {
    replies: Mutex<HashMap<OrderId, VecDeque<ScriptedReply>>>,
    calls: AtomicUsize,
}

impl ScriptedAccrualClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, order_id: &str, reply: ScriptedReply) -> Self {
        self.push(order_id, reply);
        self
    }

    pub fn push(&self, order_id: &str, reply: ScriptedReply) {
        let mut replies = self.replies.lock().expect("poisoned script");
        replies.entry(OrderId::from(order_id)).or_default().push_back(reply);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self, order_id: &OrderId) -> Option<ScriptedReply> {
        let mut replies = self.replies.lock().expect("poisoned script");
        replies.get_mut(order_id).and_then(|q| q.pop_front())
    }
}

impl AccrualClient for ScriptedAccrualClient {
    async fn fetch_status(
        &self,
        order_id: &OrderId,
        cancel: &CancellationToken,
    ) -> Result<AccrualResponse, AccrualClientError> {
        if cancel.is_cancelled() {
            return Err(AccrualClientError::Cancelled);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        let respond = |status, accrual| Ok(AccrualResponse { order: order_id.clone(), status, accrual });
        match self.next_reply(order_id) {
            None => respond(AccrualStatus::Registered, None),
            Some(ScriptedReply::Status(status, accrual)) => respond(status, accrual),
            Some(ScriptedReply::Fail(code)) => Err(AccrualClientError::UnexpectedStatus(code)),
            Some(ScriptedReply::Slow(delay, status, accrual)) => {
                tokio::time::sleep(delay).await;
                respond(status, accrual)
            },
            Some(ScriptedReply::Panic) => panic!("scripted panic for order {order_id}"),
        }
    }
}
