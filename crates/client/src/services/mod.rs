pub mod batch_mutation;
pub mod dashboard;
pub mod group_editor;
pub mod records;
pub mod sensors;

pub use batch_mutation::{BatchMutationExecutor, BatchResult, MutationOutcome, RemoteMutation};
pub use dashboard::{DashboardOverview, DashboardService};
pub use group_editor::{GroupEditor, SaveOutcome};
pub use records::{AppointmentSchedule, RecordService};
pub use sensors::{SensorCard, SensorService, SensorWrite};
