//! 匯出進度回報
//!
//! `Materializer` 只透過 `ProgressObserver` 回報進度，不直接操作終端機

use super::materializer::{EntryOutcome, MaterializationReport};
use crate::error::CurationError;
use std::sync::mpsc::Sender;

pub trait ProgressObserver {
    /// 每處理完一筆（不論成功與否）呼叫一次，`current` 從 1 開始
    fn on_progress(&mut self, current: usize, total: usize);

    fn on_entry(&mut self, _source: &str, _outcome: &EntryOutcome) {}

    fn on_finished(&mut self, _report: &MaterializationReport) {}

    fn on_failed(&mut self, _error: &CurationError) {}
}

impl<F> ProgressObserver for F
where
    F: FnMut(usize, usize),
{
    fn on_progress(&mut self, current: usize, total: usize) {
        self(current, total);
    }
}

/// 從工作執行緒送回前景的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Entry {
        source: String,
        outcome: EntryOutcome,
    },
    Progress {
        current: usize,
        total: usize,
    },
    Finished(MaterializationReport),
    Failed(String),
}

/// 把進度轉成 `ProgressEvent` 經由 channel 送出
pub struct ChannelObserver {
    sender: Sender<ProgressEvent>,
}

impl ChannelObserver {
    #[must_use]
    pub const fn new(sender: Sender<ProgressEvent>) -> Self {
        Self { sender }
    }

    fn send(&self, event: ProgressEvent) {
        // 接收端已關閉時不需要再回報
        let _ = self.sender.send(event);
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_entry(&mut self, source: &str, outcome: &EntryOutcome) {
        self.send(ProgressEvent::Entry {
            source: source.to_string(),
            outcome: outcome.clone(),
        });
    }

    fn on_progress(&mut self, current: usize, total: usize) {
        self.send(ProgressEvent::Progress { current, total });
    }

    fn on_finished(&mut self, report: &MaterializationReport) {
        self.send(ProgressEvent::Finished(report.clone()));
    }

    fn on_failed(&mut self, error: &CurationError) {
        self.send(ProgressEvent::Failed(error.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::list_materializer::materializer::SkipReason;
    use std::sync::mpsc;

    #[test]
    fn test_closure_observer() {
        let mut seen = Vec::new();
        {
            let mut observer = |current: usize, total: usize| seen.push((current, total));
            observer.on_progress(1, 2);
            observer.on_progress(2, 2);
        }
        assert_eq!(seen, vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn test_channel_observer_forwards_events_in_order() {
        let (sender, receiver) = mpsc::channel();
        let mut observer = ChannelObserver::new(sender);

        let outcome = EntryOutcome::Skipped(SkipReason::SourceMissing);
        observer.on_entry("/src/missing.jpg", &outcome);
        observer.on_progress(1, 1);
        observer.on_finished(&MaterializationReport::default());
        drop(observer);

        let events: Vec<ProgressEvent> = receiver.iter().collect();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            ProgressEvent::Entry {
                source: "/src/missing.jpg".to_string(),
                outcome,
            }
        );
        assert_eq!(events[1], ProgressEvent::Progress { current: 1, total: 1 });
        assert!(matches!(events[2], ProgressEvent::Finished(_)));
    }

    #[test]
    fn test_channel_observer_ignores_closed_receiver() {
        let (sender, receiver) = mpsc::channel();
        drop(receiver);
        let mut observer = ChannelObserver::new(sender);
        observer.on_progress(1, 1);
    }
}
