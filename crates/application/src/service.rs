use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use product_inspect_domain::{
    Classification, CompanyProfile, DashboardSummary, Detection, InspectionStatus, Product,
    ProductId, ReportTable, TickMetrics, UploadReport,
};
use tracing::{info, warn};

use crate::report::{build_report, log_preview_table};
use crate::{
    AddProductCommand, ApplicationError, BootstrapCommand, Clock, DashboardQuery,
    DeleteProductCommand, ExportReportCommand, InspectionMetricsQuery, InspectionRunner,
    InspectionStatusQuery, InspectionStore, ListProductsQuery, PollInspectionCommand,
    RecentDetectionsQuery, ReportPreviewQuery, ReportWriter, SnapshotStore,
    StartInspectionCommand, StopInspectionCommand, TrainModelCommand, UpdateProductCommand,
    UploadSamplesCommand,
};

pub const TRAINING_MESSAGE: &str =
    "Training process initiated. This would typically take several minutes in a real system.";

pub struct ApplicationService {
    store: InspectionStore,
    inspection: Box<dyn InspectionRunner>,
    writers: Vec<Box<dyn ReportWriter>>,
    clock: Arc<dyn Clock>,
}

impl ApplicationService {
    pub fn new(
        snapshots: Box<dyn SnapshotStore>,
        inspection: Box<dyn InspectionRunner>,
        writers: Vec<Box<dyn ReportWriter>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store: InspectionStore::new(snapshots, Arc::clone(&clock)),
            inspection,
            writers,
            clock,
        }
    }

    pub fn bootstrap(&mut self, _command: BootstrapCommand) -> Result<(), ApplicationError> {
        self.store.restore()
    }

    pub fn dashboard(&self, _query: DashboardQuery) -> DashboardSummary {
        let counters = self.store.counters();
        let history = self.store.history();
        DashboardSummary {
            total: counters.total,
            good: counters.good,
            bad: counters.bad,
            speed_ms: counters.speed,
            pass_rate_percent: counters.pass_rate_percent(),
            defect_rate_percent: counters.defect_rate_percent(),
            recent_detections: history.len(),
            recent_good: history.count_of(Classification::Good),
            recent_bad: history.count_of(Classification::Bad),
        }
    }

    pub fn recent_detections(&self, query: RecentDetectionsQuery) -> Vec<Detection> {
        self.store.history().newest(query.limit)
    }

    pub fn company(&self) -> &CompanyProfile {
        self.store.company()
    }

    pub fn list_products(&self, _query: ListProductsQuery) -> Vec<Product> {
        self.store.company().products.clone()
    }

    pub fn add_product(&mut self, command: AddProductCommand) -> Result<ProductId, ApplicationError> {
        let id = self.store.add_product(command.draft)?;
        info!(product_id = id.get(), "product added");
        Ok(id)
    }

    pub fn update_product(&mut self, command: UpdateProductCommand) -> Result<usize, ApplicationError> {
        let updated = self.store.update_product(command.id, &command.draft)?;
        if updated == 0 {
            return Err(ApplicationError::NotFound(format!(
                "product not found for id={}",
                command.id.get()
            )));
        }
        info!(product_id = command.id.get(), updated, "product updated");
        Ok(updated)
    }

    /// Returns the number of removed entries; an unconfirmed delete changes nothing.
    pub fn delete_product(&mut self, command: DeleteProductCommand) -> Result<usize, ApplicationError> {
        if !command.confirmed {
            info!(product_id = command.id.get(), "product delete not confirmed");
            return Ok(0);
        }
        let removed = self.store.delete_product(command.id)?;
        info!(product_id = command.id.get(), removed, "product deleted");
        Ok(removed)
    }

    pub fn upload_training_samples(
        &mut self,
        command: UploadSamplesCommand,
    ) -> Result<UploadReport, ApplicationError> {
        if command.files.is_empty() {
            return Err(ApplicationError::InvalidInput(
                "at least one sample file is required".to_string(),
            ));
        }
        let accepted = command.files.len() as u64;
        let totals = self.store.record_training_samples(command.kind, accepted)?;
        info!(kind = command.kind.as_str(), accepted, "training samples uploaded");
        Ok(UploadReport {
            kind: command.kind,
            accepted,
            totals,
        })
    }

    pub fn train_model(&self, _command: TrainModelCommand) -> &'static str {
        let samples = self.store.company().training_samples;
        info!(
            good = samples.good,
            defective = samples.defective,
            "model training requested"
        );
        TRAINING_MESSAGE
    }

    pub fn start_inspection(
        &mut self,
        command: StartInspectionCommand,
    ) -> Result<InspectionStatus, ApplicationError> {
        if let Err(error) = self.inspection.start(command.request) {
            warn!(%error, "inspection could not start");
            return Err(error);
        }
        let status = self.inspection.status();
        info!(camera_ready = status.camera_ready, "inspection started");
        Ok(status)
    }

    /// Stops the runner and records whatever it emitted before shutting down.
    pub fn stop_inspection(&mut self, _command: StopInspectionCommand) -> Result<usize, ApplicationError> {
        self.inspection.stop()?;
        let drained = self.poll_inspection(PollInspectionCommand)?;
        info!(drained, "inspection stopped");
        Ok(drained)
    }

    /// Drains pending batches into the store and returns the number of detections recorded.
    pub fn poll_inspection(&mut self, _command: PollInspectionCommand) -> Result<usize, ApplicationError> {
        let mut recorded = 0;
        while let Some(batch) = self.inspection.try_receive_batch()? {
            recorded += batch.detections.len();
            self.store.record_batch(&batch)?;
        }
        Ok(recorded)
    }

    pub fn inspection_status(&self, _query: InspectionStatusQuery) -> InspectionStatus {
        self.inspection.status()
    }

    pub fn inspection_metrics(
        &self,
        _query: InspectionMetricsQuery,
    ) -> Result<TickMetrics, ApplicationError> {
        self.inspection.metrics()
    }

    pub fn export_report(&self, command: ExportReportCommand) -> Result<PathBuf, ApplicationError> {
        let writer = self
            .writers
            .iter()
            .find(|writer| writer.format() == command.format)
            .ok_or_else(|| {
                ApplicationError::InvalidInput(format!(
                    "no writer registered for .{} reports",
                    command.format.extension()
                ))
            })?;

        let now = self.clock.now();
        let table = build_report(
            command.format,
            &self.store.counters(),
            &now.with_timezone(&Local),
            &mut rand::thread_rng(),
        );
        let file_name = command
            .format
            .file_name(&now.format("%Y-%m-%d").to_string());
        let destination = command.out_dir.join(file_name);

        if let Err(error) = writer.write(&table, &destination) {
            warn!(%error, path = %destination.display(), "report export failed");
            return Err(error);
        }
        info!(path = %destination.display(), "report exported");
        Ok(destination)
    }

    pub fn report_preview(&self, _query: ReportPreviewQuery) -> ReportTable {
        log_preview_table(
            &self.store.counters(),
            &self.clock.now().with_timezone(&Local),
            &mut rand::thread_rng(),
        )
    }
}
