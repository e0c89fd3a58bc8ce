use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Login or refresh job. Its task state doubles as the sign-in timer.
    SignIn,
    RecoverPassword,
}

impl TaskKind {
    pub fn for_job(job: &casper_core::Job) -> Self {
        if job.is_sign_in() {
            TaskKind::SignIn
        } else {
            TaskKind::RecoverPassword
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskStarted {
    pub id: TaskId,
    pub cancel: Option<CancellationToken>,
}

#[derive(Debug)]
pub struct TaskCompleted<E> {
    pub id: TaskId,
    pub result: E,
}

/// Task lifecycle state (stored in AppState, mutated only by reducer).
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
    pub cancel: Option<CancellationToken>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Marks `id` as the active task before the runtime has spawned it.
    pub fn begin(&mut self, id: TaskId) {
        self.active = Some(id);
        self.cancel = None;
    }

    /// Attaches the runtime's cancel token. Returns false if `started` is stale.
    pub fn on_started(&mut self, started: &TaskStarted) -> bool {
        let ok = self.active == Some(started.id);
        if ok {
            self.cancel = started.cancel.clone();
        }
        ok
    }

    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.clear();
        }
        ok
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.cancel = None;
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub sign_in: TaskState,
    pub recover_password: TaskState,
}

impl Tasks {
    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::SignIn => &mut self.sign_in,
            TaskKind::RecoverPassword => &mut self.recover_password,
        }
    }

    pub fn is_any_running(&self) -> bool {
        self.sign_in.is_running() || self.recover_password.is_running()
    }
}
