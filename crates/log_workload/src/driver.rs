use {
    crate::{
        payload::write_payload, ClientInitError, ConfigError, LogClient, OperationError,
        Properties, WorkloadConfig, WorkloadError, WorkloadPlan, CLIENT_ID_KEY,
    },
    op_history::{
        ActorId, History, HistoryRecorder, HistorySerializer, RequestId, RequestIdAllocator,
    },
    std::{
        any::Any,
        io,
        path::Path,
        sync::Arc,
        thread::{self, JoinHandle},
    },
    tracing::{debug, error, info, warn},
};

/// Writes reported by the log client carry no position, so write responses record this one.
pub const WRITE_INDEX_PLACEHOLDER: i64 = 0;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Writer,
    Reader,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TaskOutcome {
    /// Every operation received a response.
    Completed { operations: usize },

    /// The client never initialized, so the task recorded nothing.
    InitFailed(ClientInitError),

    /// `request_id` failed and was left without a response; the task issued nothing after it.
    Crashed {
        request_id: RequestId,
        completed: usize,
        error: OperationError,
    },

    /// The task panicked. Any operation it had in flight is left without a response.
    Panicked(String),

    /// No thread could be started for the task, so it recorded nothing.
    SpawnFailed(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TaskReport {
    pub actor_id: ActorId,
    pub role: Role,
    pub outcome: TaskOutcome,
}

/// Everything a run produced. `history` holds every record in append order.
#[derive(Debug)]
pub struct WorkloadReport {
    pub plan: WorkloadPlan,
    pub tasks: Vec<TaskReport>,
    pub history: History,
}

impl WorkloadReport {
    /// Whether every task completed every operation.
    pub fn is_clean(&self) -> bool {
        self.tasks
            .iter()
            .all(|t| matches!(t.outcome, TaskOutcome::Completed { .. }))
    }

    /// Tasks that did not complete.
    pub fn failures(&self) -> impl Iterator<Item = &TaskReport> + '_ {
        self.tasks
            .iter()
            .filter(|t| !matches!(t.outcome, TaskOutcome::Completed { .. }))
    }
}

/// What one task needs to record its operations.
struct Recording {
    actor_id: ActorId,
    ids: RequestIdAllocator,
    recorder: Arc<HistoryRecorder>,
}

impl Recording {
    fn write<C: LogClient>(&self, client: &mut C, count: usize) -> TaskOutcome {
        for op_index in 0..count {
            let payload = write_payload(self.actor_id, op_index);
            let request_id = self.ids.next();
            self.recorder
                .record_write_invoke(request_id, self.actor_id, payload.as_str());
            match client.append_entry(&payload) {
                Ok(sequence_numbers) => self.recorder.record_write_response(
                    request_id,
                    self.actor_id,
                    WRITE_INDEX_PLACEHOLDER,
                    sequence_numbers,
                ),
                Err(error) => return self.crashed(request_id, op_index, error.into()),
            }
        }
        TaskOutcome::Completed { operations: count }
    }

    fn read<C: LogClient>(&self, client: &mut C, count: usize) -> TaskOutcome {
        for op_index in 0..count {
            let request_id = self.ids.next();
            let snapshot = self.recorder.record_read_invoke(request_id, self.actor_id);
            debug!(actor_id = %self.actor_id, %request_id, snapshot, "Reading.");
            let index = op_index as u64;
            match client.read_entry(index) {
                Ok(value) => self.recorder.record_read_response(
                    request_id,
                    self.actor_id,
                    value,
                    op_index as i64,
                ),
                Err(error) => return self.crashed(request_id, op_index, error.into()),
            }
        }
        TaskOutcome::Completed { operations: count }
    }

    fn crashed(
        &self,
        request_id: RequestId,
        completed: usize,
        error: OperationError,
    ) -> TaskOutcome {
        warn!(
            actor_id = %self.actor_id,
            %request_id,
            %error,
            "Operation failed. Leaving it incomplete and stopping the task."
        );
        TaskOutcome::Crashed {
            request_id,
            completed,
            error,
        }
    }
}

/// Waits for a task and reports how it ended.
fn join_task(
    actor_id: ActorId,
    role: Role,
    spawned: io::Result<JoinHandle<TaskOutcome>>,
) -> TaskReport {
    let outcome = match spawned {
        Ok(handle) => handle.join().unwrap_or_else(|panic| {
            let panic = panic_message(panic.as_ref());
            error!(%actor_id, %panic, "Task exited due to panic.");
            TaskOutcome::Panicked(panic)
        }),
        Err(err) => {
            error!(%actor_id, %err, "Unable to spawn task.");
            TaskOutcome::SpawnFailed(err.to_string())
        }
    };
    TaskReport {
        actor_id,
        role,
        outcome,
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Runs writer and reader tasks against a log and records what each observes.
///
/// Each run gets a fresh [`RequestIdAllocator`] and [`HistoryRecorder`]; nothing is shared
/// between runs. Writers are actors `0..num_writers` and readers follow them. Every task builds
/// its own client from the factory passed to [`WorkloadDriver::run`], with a copy of the
/// driver's [`Properties`] in which [`CLIENT_ID_KEY`] is set to the actor ID.
///
/// A failed operation stays in the history as an invoke without a response, and its task stops
/// there. Other tasks are unaffected. The history is only handed out once every task has been
/// joined.
pub struct WorkloadDriver {
    plan: WorkloadPlan,
    properties: Properties,
}

impl WorkloadDriver {
    pub fn new(config: WorkloadConfig, properties: Properties) -> Result<Self, ConfigError> {
        let plan = config.plan()?;
        Ok(WorkloadDriver { plan, properties })
    }

    /// Builds the configuration from `count`, `threads` and `ratio` in `properties`.
    pub fn from_properties(properties: Properties) -> Result<Self, ConfigError> {
        let config = WorkloadConfig::from_properties(&properties)?;
        Self::new(config, properties)
    }

    pub fn plan(&self) -> WorkloadPlan {
        self.plan
    }

    pub fn run<C, F>(&self, new_client: F) -> WorkloadReport
    where
        C: LogClient + 'static,
        F: Fn(ActorId) -> C + Send + Sync + 'static,
    {
        let plan = self.plan;
        info!(
            writers = plan.num_writers,
            readers = plan.num_readers,
            "Running with {} writers and {} readers.",
            plan.num_writers,
            plan.num_readers
        );
        let ids = RequestIdAllocator::new();
        let recorder = Arc::new(HistoryRecorder::new());
        let new_client = Arc::new(new_client);

        let writers = std::iter::repeat((Role::Writer, plan.operations_per_writer));
        let readers = std::iter::repeat((Role::Reader, plan.operations_per_reader));
        let roles = writers
            .take(plan.num_writers)
            .chain(readers.take(plan.num_readers));
        let handles: Vec<(ActorId, Role, io::Result<JoinHandle<TaskOutcome>>)> = roles
            .enumerate()
            .map(|(actor, (role, count))| {
                let actor_id = ActorId::from(actor);
                let recording = Recording {
                    actor_id,
                    ids: ids.clone(),
                    recorder: Arc::clone(&recorder),
                };
                let mut properties = self.properties.clone();
                properties.set_property(CLIENT_ID_KEY, actor_id.to_string());
                let new_client = Arc::clone(&new_client);
                let spawned = thread::Builder::new()
                    .name(format!("actor-{actor_id}"))
                    .spawn(move || {
                        let mut client = new_client(actor_id);
                        if let Err(error) = client.initialize(&properties) {
                            warn!(%actor_id, %error, "Client failed to initialize. Task aborted.");
                            return TaskOutcome::InitFailed(error);
                        }
                        debug!(%actor_id, ?role, count, "Task started.");
                        let outcome = match role {
                            Role::Writer => recording.write(&mut client, count),
                            Role::Reader => recording.read(&mut client, count),
                        };
                        debug!(%actor_id, ?outcome, "Task finished.");
                        outcome
                    });
                (actor_id, role, spawned)
            })
            .collect();

        // No history is handed out until every task has finished.
        let tasks: Vec<TaskReport> = handles
            .into_iter()
            .map(|(actor_id, role, spawned)| join_task(actor_id, role, spawned))
            .collect();

        let history = Arc::try_unwrap(recorder)
            .map(HistoryRecorder::into_history)
            .unwrap_or_else(|shared| shared.snapshot());
        info!(
            records = history.len(),
            issued = ids.issued(),
            "All tasks finished."
        );
        WorkloadReport {
            plan,
            tasks,
            history,
        }
    }

    /// Runs the workload, then writes the history to `path`. If writing fails, the report is
    /// returned inside the error so the history is not lost.
    pub fn run_and_dump<C, F>(
        &self,
        new_client: F,
        serializer: HistorySerializer,
        path: impl AsRef<Path>,
    ) -> Result<WorkloadReport, WorkloadError>
    where
        C: LogClient + 'static,
        F: Fn(ActorId) -> C + Send + Sync + 'static,
    {
        let report = self.run(new_client);
        match serializer.dump(&report.history, path) {
            Ok(()) => Ok(report),
            Err(source) => {
                error!(%source, "Unable to dump history.");
                Err(WorkloadError::Dump {
                    source,
                    report: Box::new(report),
                })
            }
        }
    }
}
