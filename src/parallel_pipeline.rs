// THEORY:
// The `parallel_pipeline` module spreads one frame's extraction across a
// tokio worker pool. Extraction is embarrassingly parallel: every cell reads
// the shared frame through its own mask and writes only its own color, so
// the frame is split into contiguous cell ranges, one per worker, and the
// partial results are spliced back together by range start index.
//
// Determinism is a hard requirement: for the same frame and geometry the
// parallel path must produce byte-identical output to
// `LedPipeline::process_frame`, regardless of worker count or completion
// order. Reordering into LED order and gamma correction therefore happen
// once, after the splice, on the assembled cell-order array — never inside
// a worker.

use crate::core_modules::color::color::Rgb;
use crate::pipeline::LedPipeline;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// One contiguous slice of the frame's cells, handed to a worker.
struct RangeTask {
    frame: Arc<Vec<u8>>,
    start: usize,
    end: usize,
    result_sender: oneshot::Sender<(usize, Vec<Rgb>)>,
}

/// A fixed pool of extraction workers over a shared, immutable pipeline.
pub struct ParallelPipeline {
    pipeline: Arc<LedPipeline>,
    worker_senders: Vec<mpsc::UnboundedSender<RangeTask>>,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl ParallelPipeline {
    /// Spawn one worker per available core, capped at the cell count.
    pub fn new(pipeline: Arc<LedPipeline>) -> Self {
        let worker_count = num_cpus::get().clamp(1, pipeline.cell_count().max(1));
        Self::with_workers(pipeline, worker_count)
    }

    pub fn with_workers(pipeline: Arc<LedPipeline>, worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let mut worker_senders = Vec::with_capacity(worker_count);
        let mut workers = Vec::with_capacity(worker_count);

        for _ in 0..worker_count {
            let (sender, mut receiver) = mpsc::unbounded_channel::<RangeTask>();
            let worker_pipeline = Arc::clone(&pipeline);

            let worker = tokio::spawn(async move {
                while let Some(task) = receiver.recv().await {
                    let colors =
                        worker_pipeline.extract_range(&task.frame, task.start, task.end);
                    // The caller may have given up on the frame; that is its
                    // problem, not ours.
                    let _ = task.result_sender.send((task.start, colors));
                }
            });

            worker_senders.push(sender);
            workers.push(worker);
        }

        log::debug!("parallel extraction pool ready with {worker_count} workers");
        Self { pipeline, worker_senders, workers }
    }

    /// Extract one frame across the pool. Same contract and same output as
    /// `LedPipeline::process_frame`, bit for bit.
    pub async fn process_frame(&self, frame: Arc<Vec<u8>>) -> Vec<Rgb> {
        if !self.pipeline.frame_is_valid(&frame) {
            return vec![Rgb::BLACK; self.pipeline.total_leds()];
        }

        let cell_count = self.pipeline.cell_count();
        let worker_count = self.worker_senders.len();
        let chunk = cell_count.div_ceil(worker_count).max(1);

        let mut receivers = Vec::with_capacity(worker_count);
        for (worker, start) in (0..cell_count).step_by(chunk).enumerate() {
            let end = (start + chunk).min(cell_count);
            let (result_sender, result_receiver) = oneshot::channel();
            let task = RangeTask { frame: Arc::clone(&frame), start, end, result_sender };
            if self.worker_senders[worker % worker_count].send(task).is_err() {
                // A worker died; fall back to the serial path for this frame.
                log::error!("extraction worker unavailable, processing frame serially");
                return self.pipeline.process_frame(&frame);
            }
            receivers.push(result_receiver);
        }

        let mut cell_colors = vec![Rgb::BLACK; cell_count];
        for result in futures::future::join_all(receivers).await {
            match result {
                Ok((start, colors)) => {
                    cell_colors[start..start + colors.len()].copy_from_slice(&colors);
                }
                Err(_) => {
                    log::error!("extraction worker dropped a result, processing frame serially");
                    return self.pipeline.process_frame(&frame);
                }
            }
        }

        self.pipeline.finalize(cell_colors)
    }

    pub fn pipeline(&self) -> &LedPipeline {
        &self.pipeline
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for ParallelPipeline {
    fn drop(&mut self) {
        // Closing the channels lets the workers drain and exit.
        self.worker_senders.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::cells::SamplingLayout;
    use crate::core_modules::color::color::ChannelOrder;
    use crate::core_modules::extractor::ExtractionStrategy;
    use crate::core_modules::layout::{Direction, StartCorner};
    use crate::pipeline::PipelineConfig;

    fn edge_config() -> PipelineConfig {
        PipelineConfig {
            frame_width: 160,
            frame_height: 90,
            top_curve: "M 5 5 C 55 5 105 5 155 5".into(),
            right_curve: "M 155 5 C 155 30 155 60 155 85".into(),
            bottom_curve: "M 155 85 C 105 85 55 85 5 85".into(),
            left_curve: "M 5 85 C 5 60 5 30 5 5".into(),
            curve_samples: 20,
            polygon_samples: 6,
            fit_curves: false,
            scale_factor: 1.0,
            layout: SamplingLayout::EdgeSlices {
                horizontal_slices: 7,
                vertical_slices: 4,
                horizontal_coverage_percent: 15.0,
                vertical_coverage_percent: 10.0,
            },
            strategy: ExtractionStrategy::Mean,
            channel_order: ChannelOrder::Bgr,
            start_corner: StartCorner::BottomLeft,
            direction: Direction::CounterClockwise,
            gamma: None,
        }
    }

    fn pseudo_random_frame(width: usize, height: usize) -> Vec<u8> {
        let mut state: u32 = 0x1234_5678;
        (0..width * height * 3)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 24) as u8
            })
            .collect()
    }

    #[tokio::test]
    async fn parallel_output_matches_serial_bit_for_bit() {
        let pipeline = Arc::new(LedPipeline::new(edge_config()).unwrap());
        let frame = Arc::new(pseudo_random_frame(160, 90));
        let serial = pipeline.process_frame(&frame);

        for worker_count in [1, 2, 3, 8, 64] {
            let pool = ParallelPipeline::with_workers(Arc::clone(&pipeline), worker_count);
            let parallel = pool.process_frame(Arc::clone(&frame)).await;
            assert_eq!(parallel, serial, "{worker_count} workers diverged from serial");
        }
    }

    #[tokio::test]
    async fn short_frame_is_black_in_the_parallel_path_too() {
        let pipeline = Arc::new(LedPipeline::new(edge_config()).unwrap());
        let pool = ParallelPipeline::with_workers(Arc::clone(&pipeline), 2);
        let colors = pool.process_frame(Arc::new(vec![0u8; 16])).await;
        assert_eq!(colors.len(), pipeline.total_leds());
        assert!(colors.iter().all(|&c| c == Rgb::BLACK));
    }
}
