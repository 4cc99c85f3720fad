//! Frame partitioning and the worker pool that claims tiles from a shared counter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};

use log::{debug, info};
use threadpool::ThreadPool;

use super::buffer::{FrameBuffer, TileRect, TileTarget};
use crate::error::RenderError;

pub const TILE_SIZE: u32 = 32;

/// Row-major grid of square tiles covering a frame, the last row and column may be partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
    pub tiles_x: u32,
    pub tiles_y: u32,
}

impl TileGrid {
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        let tile_size = tile_size.max(1);
        return Self {
            width,
            height,
            tile_size,
            tiles_x: (width + tile_size - 1) / tile_size,
            tiles_y: (height + tile_size - 1) / tile_size,
        };
    }

    pub fn total(&self) -> usize {
        return (self.tiles_x * self.tiles_y) as usize;
    }

    /// Pixel rectangle of the tile with linear index `index`.
    pub fn rect(&self, index: usize) -> TileRect {
        let index = index as u32;
        let x0 = (index % self.tiles_x) * self.tile_size;
        let y0 = (index / self.tiles_x) * self.tile_size;
        return TileRect {
            x0,
            y0,
            x1: (x0 + self.tile_size).min(self.width),
            y1: (y0 + self.tile_size).min(self.height),
        };
    }

    pub fn rects(&self) -> impl Iterator<Item = TileRect> + '_ {
        return (0..self.total()).map(move |index| self.rect(index));
    }
}

/// What one worker did during a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: usize,
    pub tiles: usize,
    pub pixels: u64,
}

/// Per-frame counters returned by the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Tiles claimed by each worker, indexed by worker.
    pub tiles_per_worker: Vec<usize>,
    pub triangles: usize,
    pub pixels_written: u64,
}

/// Fixed set of render threads. Each frame every worker gets one job that keeps
/// claiming tile indices until the counter runs past the grid, then the caller joins.
pub struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
    tile_counter: Arc<AtomicUsize>,
    panics_seen: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        info!("Starting {} render workers", workers);
        return Self {
            pool: threadpool::Builder::new()
                .num_threads(workers)
                .thread_name(String::from("render-worker"))
                .build(),
            workers,
            tile_counter: Arc::new(AtomicUsize::new(0)),
            panics_seen: 0,
        };
    }

    pub fn workers(&self) -> usize {
        return self.workers;
    }

    /// Renders one frame: `job` is called for every tile with the claiming worker's
    /// index and a target restricted to that tile, and returns the pixels it wrote.
    /// Returns once every worker has run out of tiles.
    pub fn dispatch<F>(
        &mut self,
        frame: &mut FrameBuffer,
        grid: &TileGrid,
        job: Arc<F>,
    ) -> Result<Vec<WorkerReport>, RenderError>
    where
        F: Fn(usize, TileRect, &mut TileTarget) -> u64 + Send + Sync + 'static,
    {
        if grid.width != frame.width || grid.height != frame.height {
            return Err(RenderError::GridMismatch {
                grid_width: grid.width,
                grid_height: grid.height,
                frame_width: frame.width,
                frame_height: frame.height,
            });
        }
        self.tile_counter.store(0, Ordering::SeqCst);
        // Safety: tiles of one grid never overlap and lie inside the frame, and `join` below
        // returns only after every job that holds a tile target has finished.
        let shared = unsafe { frame.share() };
        let (done_sender, done_receiver) = mpsc::channel();

        for worker in 0..self.workers {
            let counter = Arc::clone(&self.tile_counter);
            let job = Arc::clone(&job);
            let done = done_sender.clone();
            let grid = *grid;
            self.pool.execute(move || {
                let mut report = WorkerReport { worker, ..WorkerReport::default() };
                loop {
                    let index = counter.fetch_add(1, Ordering::Relaxed);
                    if index >= grid.total() {
                        break;
                    }
                    let rect = grid.rect(index);
                    let mut tile = unsafe { shared.tile(rect) };
                    report.pixels += job(worker, rect, &mut tile);
                    report.tiles += 1;
                }
                // The receiver outlives the join, a failed send only means the frame was abandoned.
                let _ = done.send(report);
            });
        }
        drop(done_sender);
        self.pool.join();

        let panics = self.pool.panic_count();
        if panics > self.panics_seen {
            let new_panics = panics - self.panics_seen;
            self.panics_seen = panics;
            return Err(RenderError::WorkerPanic(new_panics));
        }

        let mut reports: Vec<WorkerReport> = done_receiver.try_iter().collect();
        reports.sort_by_key(|report| report.worker);
        debug!(
            "Frame split over {} workers: {:?}",
            reports.len(),
            reports.iter().map(|report| report.tiles).collect::<Vec<_>>()
        );
        return Ok(reports);
    }
}

// `join` drains every queued job. The threads themselves exit once the pool's job
// channel closes and are not joined individually.
impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.pool.join();
        info!("Stopped {} render workers", self.workers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::buffer::PixelTarget;

    #[test]
    fn grid_rounds_partial_tiles_up() {
        let grid = TileGrid::new(800, 600, 32);
        assert_eq!((grid.tiles_x, grid.tiles_y), (25, 19));
        let last = grid.rect(grid.total() - 1);
        assert_eq!(last, TileRect { x0: 768, y0: 576, x1: 800, y1: 600 });
    }

    #[test]
    fn tiles_are_row_major() {
        let grid = TileGrid::new(100, 70, 32);
        assert_eq!(grid.rect(1), TileRect { x0: 32, y0: 0, x1: 64, y1: 32 });
        assert_eq!(grid.rect(4), TileRect { x0: 0, y0: 32, x1: 32, y1: 64 });
        assert_eq!(grid.rect(3), TileRect { x0: 96, y0: 0, x1: 100, y1: 32 });
    }

    #[test]
    fn every_tile_is_claimed_once() {
        let mut pool = WorkerPool::new(4);
        let mut frame = FrameBuffer::new(100, 70);
        let grid = TileGrid::new(100, 70, 32);
        let job = Arc::new(|_worker: usize, rect: TileRect, tile: &mut TileTarget| -> u64 {
            tile.put_color(rect.x0, rect.y0, 0xFFFF_FFFF);
            return 1;
        });
        let reports = pool.dispatch(&mut frame, &grid, job).unwrap();
        assert_eq!(reports.len(), 4);
        assert_eq!(reports.iter().map(|r| r.tiles).sum::<usize>(), grid.total());
        assert_eq!(reports.iter().map(|r| r.pixels).sum::<u64>(), grid.total() as u64);
        for rect in grid.rects() {
            assert_eq!(frame.pixel(rect.x0, rect.y0), 0xFFFF_FFFF);
        }
    }

    #[test]
    fn panicking_worker_is_reported_and_pool_recovers() {
        let mut pool = WorkerPool::new(2);
        let mut frame = FrameBuffer::new(64, 64);
        let grid = TileGrid::new(64, 64, 32);
        let failing = Arc::new(|_worker: usize, rect: TileRect, _tile: &mut TileTarget| -> u64 {
            if rect.x0 == 32 && rect.y0 == 32 {
                panic!("tile exploded");
            }
            return 0;
        });
        assert!(matches!(pool.dispatch(&mut frame, &grid, failing), Err(RenderError::WorkerPanic(1))));

        let fine = Arc::new(|_worker: usize, _rect: TileRect, _tile: &mut TileTarget| -> u64 { 0 });
        let reports = pool.dispatch(&mut frame, &grid, fine).unwrap();
        assert_eq!(reports.iter().map(|r| r.tiles).sum::<usize>(), 4);
    }

    #[test]
    fn grid_for_another_frame_size_is_rejected() {
        let mut pool = WorkerPool::new(2);
        let mut frame = FrameBuffer::new(64, 64);
        let grid = TileGrid::new(128, 64, 32);
        let job = Arc::new(|_worker: usize, rect: TileRect, tile: &mut TileTarget| -> u64 {
            tile.put_color(rect.x1 - 1, rect.y1 - 1, 7);
            return 1;
        });
        let err = pool.dispatch(&mut frame, &grid, job).unwrap_err();
        assert!(matches!(err, RenderError::GridMismatch { grid_width: 128, frame_width: 64, .. }));
        assert!(frame.color().iter().all(|&c| c != 7));
    }
}
