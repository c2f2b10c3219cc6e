// THEORY:
// The parallel pipeline spreads object images over a pool of tokio workers. Each
// object comparison only reads the shared scene and scene histogram and writes
// its own report, so the tasks are independent. A single dispatcher hands tasks
// to workers round-robin; each worker runs the CPU-bound analysis on the blocking
// thread pool and answers through a oneshot channel. Results are awaited in
// submission order, which makes the output identical to `DetectionPipeline`.
//
// `ParallelPipeline::new` spawns tasks and must be called inside a tokio runtime.

use crate::core_modules::frame::frame::Frame;
use crate::core_modules::histogram::ChromaHistogram;
use crate::error::{DetectionError, Result};
use crate::pipeline::{Detection, DetectionPipeline, ObjectImage, ObjectReport, PipelineConfig};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

pub struct ObjectTask {
    pub object: ObjectImage,
    pub scene: Arc<Frame>,
    pub scene_histogram: Arc<ChromaHistogram>,
    pub result_sender: oneshot::Sender<ObjectReport>,
}

pub struct WorkerPool {
    task_sender: mpsc::UnboundedSender<ObjectTask>,
    dispatcher: tokio::task::JoinHandle<()>,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(pipeline: Arc<DetectionPipeline>, worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<ObjectTask>();
        let mut workers = Vec::with_capacity(worker_count);

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<ObjectTask>())
            .unzip();

        // Spawn dispatcher
        let dispatcher = tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                let _ = worker_senders[worker_idx].send(task);
                worker_idx = (worker_idx + 1) % worker_count;
            }
        });

        // Spawn workers
        for mut worker_receiver in worker_receivers {
            let worker_pipeline = Arc::clone(&pipeline);

            let worker = tokio::spawn(async move {
                while let Some(task) = worker_receiver.recv().await {
                    let pipeline = Arc::clone(&worker_pipeline);
                    let ObjectTask {
                        object,
                        scene,
                        scene_histogram,
                        result_sender,
                    } = task;

                    let analysis = tokio::task::spawn_blocking(move || {
                        pipeline.analyze_object(&scene, &scene_histogram, &object)
                    })
                    .await;

                    match analysis {
                        Ok(report) => {
                            let _ = result_sender.send(report);
                        }
                        // Dropping the sender reports the failure to the caller.
                        Err(e) => log::error!("object analysis task failed: {e}"),
                    }
                }
            });

            workers.push(worker);
        }

        Self {
            task_sender,
            dispatcher,
            workers,
        }
    }

    pub fn submit(&self, task: ObjectTask) -> Result<()> {
        self.task_sender
            .send(task)
            .map_err(|_| DetectionError::WorkerPool("failed to send task to worker pool"))
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stops accepting tasks and waits for queued work to drain.
    pub async fn shutdown(self) {
        drop(self.task_sender);
        let _ = self.dispatcher.await;
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

pub struct ParallelPipeline {
    pipeline: Arc<DetectionPipeline>,
    worker_pool: WorkerPool,
}

impl ParallelPipeline {
    /// A pool with one worker per logical CPU.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_workers(config, num_cpus::get())
    }

    pub fn with_workers(config: PipelineConfig, worker_count: usize) -> Result<Self> {
        let pipeline = Arc::new(DetectionPipeline::new(config)?);
        let worker_pool = WorkerPool::new(Arc::clone(&pipeline), worker_count);
        log::debug!("parallel pipeline started {} workers", worker_pool.worker_count());
        Ok(Self {
            pipeline,
            worker_pool,
        })
    }

    pub fn pipeline(&self) -> &DetectionPipeline {
        &self.pipeline
    }

    /// Analyses every object concurrently; reports come back in input order.
    pub async fn analyze(
        &self,
        scene: Arc<Frame>,
        objects: Vec<ObjectImage>,
    ) -> Result<Vec<ObjectReport>> {
        let scene_histogram = Arc::new(self.pipeline.scene_histogram(&scene));

        let mut receivers = Vec::with_capacity(objects.len());
        for object in objects {
            let (result_sender, result_receiver) = oneshot::channel();
            self.worker_pool.submit(ObjectTask {
                object,
                scene: Arc::clone(&scene),
                scene_histogram: Arc::clone(&scene_histogram),
                result_sender,
            })?;
            receivers.push(result_receiver);
        }

        futures::future::try_join_all(receivers)
            .await
            .map_err(|_| DetectionError::WorkerPool("failed to receive result from worker"))
    }

    pub async fn detect(
        &self,
        scene: Arc<Frame>,
        objects: Vec<ObjectImage>,
    ) -> Result<Vec<Detection>> {
        let reports = self.analyze(scene, objects).await?;
        Ok(reports.iter().flat_map(ObjectReport::detections).collect())
    }

    pub async fn shutdown(self) {
        self.worker_pool.shutdown().await;
    }
}
