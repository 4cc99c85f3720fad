use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tiled_rasterizer::color;
use tiled_rasterizer::render::buffer::{FrameBuffer, PixelTarget, TileRect, TileTarget};
use tiled_rasterizer::render::tiles::{TileGrid, WorkerPool, TILE_SIZE};

#[test]
fn tiles_cover_the_frame_exactly_once() {
    for (width, height, tile_size) in [(800, 600, TILE_SIZE), (33, 17, 8), (1, 1, 32), (64, 64, 64), (100, 3, 7)] {
        let grid = TileGrid::new(width, height, tile_size);
        let mut coverage = vec![0u32; (width * height) as usize];
        for rect in grid.rects() {
            assert!(rect.x0 < rect.x1 && rect.y0 < rect.y1, "empty tile {:?}", rect);
            for y in rect.y0..rect.y1 {
                for x in rect.x0..rect.x1 {
                    coverage[(x + y * width) as usize] += 1;
                }
            }
        }
        assert!(
            coverage.iter().all(|&count| count == 1),
            "{}x{} with tile {} is not a partition",
            width,
            height,
            tile_size
        );
    }
}

#[test]
fn every_pixel_is_written_by_exactly_one_worker() {
    let (width, height) = (203, 131);
    let grid = TileGrid::new(width, height, 16);
    let mut frame = FrameBuffer::new(width, height);
    let writes: Arc<Vec<AtomicU32>> = Arc::new((0..width * height).map(|_| AtomicU32::new(0)).collect());
    let mut pool = WorkerPool::new(8);

    for _frame in 0..3 {
        writes.iter().for_each(|count| count.store(0, Ordering::SeqCst));
        let counts = Arc::clone(&writes);
        let job = Arc::new(move |worker: usize, rect: TileRect, tile: &mut TileTarget| -> u64 {
            for y in rect.y0..rect.y1 {
                for x in rect.x0..rect.x1 {
                    counts[(x + y * width) as usize].fetch_add(1, Ordering::Relaxed);
                    tile.put(x, y, worker as u32 + 1, 1.0);
                }
            }
            return rect.area() as u64;
        });
        let reports = pool.dispatch(&mut frame, &grid, job).unwrap();

        assert!(writes.iter().all(|count| count.load(Ordering::SeqCst) == 1));
        assert_eq!(reports.iter().map(|r| r.pixels).sum::<u64>(), (width * height) as u64);
        assert_eq!(reports.iter().map(|r| r.tiles).sum::<usize>(), grid.total());
        // Every pixel carries the id of a worker that reported in.
        let workers: Vec<u32> = reports.iter().map(|r| r.worker as u32 + 1).collect();
        assert!(frame.color().iter().all(|id| workers.contains(id)));
    }
}

#[test]
fn single_worker_claims_every_tile() {
    let grid = TileGrid::new(96, 64, 32);
    let mut frame = FrameBuffer::new(96, 64);
    let mut pool = WorkerPool::new(1);
    let job = Arc::new(|_worker: usize, rect: TileRect, tile: &mut TileTarget| -> u64 {
        tile.put_color(rect.x1 - 1, rect.y1 - 1, 7);
        return 1;
    });
    let reports = pool.dispatch(&mut frame, &grid, job).unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].tiles, 6);
    assert_eq!(frame.color().iter().filter(|&&c| c == 7).count(), 6);
    assert_eq!(frame.pixel(95, 63), 7);
    assert_eq!(frame.depth(95, 63), 0.0);
}

#[test]
fn writes_outside_the_claimed_tile_are_dropped() {
    let grid = TileGrid::new(64, 64, 32);
    let mut frame = FrameBuffer::new(64, 64);
    let mut pool = WorkerPool::new(1);
    let job = Arc::new(|_worker: usize, rect: TileRect, tile: &mut TileTarget| -> u64 {
        if rect.x0 == 0 && rect.y0 == 0 {
            tile.put(50, 50, 0xDEAD_BEEF, 1.0);
            tile.put(4000, 4000, 0xDEAD_BEEF, 1.0);
            tile.put(10, 10, 0xFF00_FF00, 1.0);
        }
        return 0;
    });
    pool.dispatch(&mut frame, &grid, job).unwrap();
    assert_eq!(frame.pixel(50, 50), color::BLACK);
    assert_eq!(frame.depth(50, 50), 0.0);
    assert_eq!(frame.pixel(10, 10), 0xFF00_FF00);
}
