use {
    log_workload::{
        parse_payload, MemoryLog, OperationError, Properties, Role, TaskOutcome, WorkloadConfig,
        WorkloadDriver, WorkloadError,
    },
    op_history::{History, HistorySerializer, OperationKind, Phase},
    std::collections::BTreeSet,
};

fn driver(operations_per_task: usize, total_tasks: usize, write_fraction: f64) -> WorkloadDriver {
    WorkloadDriver::new(
        WorkloadConfig {
            operations_per_task,
            total_tasks,
            write_fraction,
        },
        Properties::new(),
    )
    .unwrap()
}

fn invokes(history: &History, kind: OperationKind) -> usize {
    history
        .iter()
        .filter(|r| r.phase() == Phase::Invoke && r.kind() == kind)
        .count()
}

#[test]
fn default_workload_shape() {
    let log = MemoryLog::new();
    let report = driver(10, 5, 0.8).run({
        let log = log.clone();
        move |_| log.client()
    });
    assert!(report.is_clean(), "{:?}", report.tasks);
    assert_eq!(report.plan.num_writers, 4);
    assert_eq!(report.plan.num_readers, 1);

    let history = &report.history;
    history.validate().unwrap();
    assert_eq!(invokes(history, OperationKind::Write), 40);
    assert_eq!(invokes(history, OperationKind::Read), 40);
    assert_eq!(log.len(), 40);

    // Request IDs are exactly 0..80, each used by one invoke and one response.
    let ids: BTreeSet<u64> = history.iter().map(|r| r.request_id().into()).collect();
    assert_eq!(ids, (0..80).collect());

    // Writer 0's third write.
    let payloads: Vec<_> = history
        .for_actor(0.into())
        .filter(|r| r.phase() == Phase::Invoke)
        .map(|r| r.payload())
        .collect();
    assert_eq!(payloads[2], "00_00002");

    // The reader is actor 4 and sweeps positions 0..40 in order.
    let reader = &report.tasks[4];
    assert_eq!(reader.role, Role::Reader);
    assert_eq!(reader.outcome, TaskOutcome::Completed { operations: 40 });
    let indexes: Vec<_> = history
        .for_actor(4.into())
        .filter(|r| r.phase() == Phase::Response)
        .map(|r| r.index())
        .collect();
    assert_eq!(indexes, (0..40).collect::<Vec<i64>>());
}

#[test]
fn reads_only_observe_invoked_writes() {
    let log = MemoryLog::new();
    let report = driver(25, 6, 0.5).run(move |_| log.client());
    assert!(report.is_clean());

    let mut invoked = BTreeSet::new();
    let mut reads = 0;
    for record in &report.history {
        match (record.phase(), record.kind()) {
            (Phase::Invoke, OperationKind::Write) => {
                invoked.insert(record.payload().to_string());
            }
            (Phase::Invoke, OperationKind::Read) => reads += 1,
            (Phase::Response, OperationKind::Read) if !record.payload().is_empty() => {
                assert!(
                    invoked.contains(record.payload()),
                    "{} read a value nobody had written yet",
                    record
                );
                assert!(parse_payload(record.payload()).is_some());
            }
            _ => {}
        }
    }
    assert_eq!(invoked.len(), 3 * 25);
    assert_eq!(reads, 3 * 75);
}

#[test]
fn read_only_workload_sees_no_writes() {
    let report = driver(10, 1, 0.0).run(|_| MemoryLog::new().client());
    assert_eq!(report.plan.num_writers, 0);
    assert_eq!(report.plan.num_readers, 1);
    let history = &report.history;
    assert_eq!(invokes(history, OperationKind::Write), 0);
    assert_eq!(invokes(history, OperationKind::Read), 10);
    assert_eq!(history.records()[0].to_string(), "inv read id=0 client=0");
    assert_eq!(history.records()[0].index(), -1);
    assert!(history
        .iter()
        .filter(|r| r.phase() == Phase::Response)
        .all(|r| r.payload().is_empty()));
}

#[test]
fn no_tasks_produces_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("execution_history.log");
    let report = driver(10, 0, 0.8)
        .run_and_dump(
            |_| MemoryLog::new().client(),
            HistorySerializer::default(),
            &path,
        )
        .unwrap();
    assert!(report.tasks.is_empty());
    assert!(report.history.is_empty());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn dumped_history_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("execution_history.log");
    let log = MemoryLog::new();
    let report = driver(5, 3, 0.7)
        .run_and_dump(move |_| log.client(), HistorySerializer::default(), &path)
        .unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.lines().count(), report.history.len());
    assert_eq!(
        HistorySerializer::default().render(&report.history).unwrap(),
        written
    );
    assert_eq!(History::parse(&written).unwrap(), report.history);
}

#[test]
fn failed_append_leaves_one_incomplete_operation() {
    let log = MemoryLog::new();
    log.fail_append("01_00003");
    let report = driver(8, 4, 0.5).run({
        let log = log.clone();
        move |_| log.client()
    });
    report.history.validate().unwrap();

    let failed = &report.tasks[1];
    let request_id = match &failed.outcome {
        TaskOutcome::Crashed {
            request_id,
            completed: 3,
            error: OperationError::Append(_),
        } => *request_id,
        outcome => panic!("Unexpected outcome: {outcome:?}"),
    };
    assert_eq!(report.history.incomplete(), vec![request_id]);

    // The failed invoke is actor 1's last record.
    let records: Vec<_> = report.history.for_actor(1.into()).collect();
    assert_eq!(records.len(), 3 * 2 + 1);
    let last = records.last().unwrap();
    assert_eq!(last.request_id(), request_id);
    assert_eq!(last.phase(), Phase::Invoke);
    assert_eq!(last.payload(), "01_00003");

    // Everyone else finished.
    for (i, task) in report.tasks.iter().enumerate().filter(|(i, _)| *i != 1) {
        assert!(
            matches!(task.outcome, TaskOutcome::Completed { .. }),
            "task {i}: {:?}",
            task.outcome
        );
    }
    assert_eq!(log.len(), 8 + 3);
}

#[test]
fn failed_read_with_strict_log() {
    let log = MemoryLog::new();
    log.set_strict_reads(true);
    // No writers, so the very first read finds nothing.
    let report = driver(4, 2, 0.0).run(move |_| log.client());
    assert_eq!(report.history.len(), 2);
    assert_eq!(report.history.incomplete().len(), 2);
    for task in &report.tasks {
        assert!(matches!(
            task.outcome,
            TaskOutcome::Crashed {
                completed: 0,
                error: OperationError::Read(_),
                ..
            }
        ));
    }
}

#[test]
fn rejected_client_records_nothing() {
    let log = MemoryLog::new();
    log.reject_client("2");
    let report = driver(3, 4, 0.75).run(move |_| log.client());
    assert!(matches!(report.tasks[2].outcome, TaskOutcome::InitFailed(_)));
    assert_eq!(report.history.for_actor(2.into()).count(), 0);
    assert_eq!(report.failures().count(), 1);
    // Writers 0 and 1 plus reader 3.
    let stats = report.history.stats();
    assert_eq!(stats.write_invokes, 6);
    assert_eq!(stats.read_invokes, 9);
    assert_eq!(stats.incomplete, 0);
}

#[test]
fn dump_failure_keeps_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("history.log");
    let log = MemoryLog::new();
    let result = driver(2, 2, 0.5).run_and_dump(
        move |_| log.client(),
        HistorySerializer::default(),
        &path,
    );
    match result {
        Err(WorkloadError::Dump { report, .. }) => {
            assert_eq!(report.history.len(), 2 * 2 + 2 * 2);
        }
        other => panic!("Unexpected result: {other:?}"),
    }
}

#[test]
fn configuration_from_properties() {
    let props: Properties = "count=2\nthreads=3\nratio=0.34\n".parse().unwrap();
    let driver = WorkloadDriver::from_properties(props).unwrap();
    assert_eq!(driver.plan().num_writers, 1);
    assert_eq!(driver.plan().num_readers, 2);
    assert_eq!(driver.plan().operations_per_reader, 2);

    let props: Properties = "ratio=2".parse().unwrap();
    assert!(WorkloadDriver::from_properties(props).is_err());
}

#[test]
fn property_files_layer_under_assignments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workload.properties");
    std::fs::write(&path, "# small run\ncount=3\nthreads=2\nratio=1\n").unwrap();

    let mut props = Properties::new();
    props.load(&path).unwrap();
    props.set_assignment("threads=4").unwrap();
    let driver = WorkloadDriver::from_properties(props).unwrap();
    assert_eq!(driver.plan().num_writers, 4);
    assert_eq!(driver.plan().num_readers, 0);

    let report = driver.run(|_| MemoryLog::new().client());
    assert!(report.is_clean());
    assert_eq!(report.history.stats().write_responses, 12);
}
