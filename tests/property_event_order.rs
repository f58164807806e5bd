// tests/property_event_order.rs

use std::sync::Arc;

use proptest::prelude::*;
use shellpump::engine::{DrainPump, EventQueue, RequestHandle};
use shellpump::exec::StreamReaderWorker;
use shellpump::types::RequestId;
use shellpump_test_utils::fake_process::FakeProcess;
use shellpump_test_utils::recording::{Recorded, RecordingSink};

fn lines_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z0-9 ]{0,12}", 0..20)
}

fn as_stream(lines: &[String]) -> String {
    lines.iter().map(|l| format!("{l}\n")).collect()
}

proptest! {
    /// Whatever the output, a request observes all stdout lines, then the
    /// non-empty stderr lines, then exactly one completion, across any
    /// number of drains.
    #[test]
    fn per_request_order_is_out_then_err_then_end(
        out in lines_strategy(),
        err in lines_strategy(),
        exit_code in -1i32..256,
        drains_before in 0usize..3,
    ) {
        let queue = Arc::new(EventQueue::new());
        let pump = DrainPump::new(Arc::clone(&queue));
        let req = RequestHandle::new(RequestId(1), "prop", true, false);
        let sink = RecordingSink::attach(&req);

        for _ in 0..drains_before {
            pump.tick();
        }

        let process = FakeProcess::new(&as_stream(&out), &as_stream(&err), exit_code);
        StreamReaderWorker::new(req.clone(), process, Arc::clone(&queue)).run();
        pump.tick();
        pump.tick();

        let mut expected: Vec<Recorded> = out.iter().cloned().map(Recorded::Info).collect();
        expected.extend(err.iter().filter(|l| !l.is_empty()).cloned().map(Recorded::Error));
        expected.push(Recorded::Complete(exit_code));

        prop_assert_eq!(sink.events(), expected);
        prop_assert_eq!(req.exit_code(), Some(exit_code));
    }
}
