//! Frame timing instrumentation.
//!
//! [`CpuTimer`] measures closures on the host timeline. [`GpuTimer`] wraps
//! wgpu timestamp queries around named passes; results are resolved into a
//! readback buffer and become available on a *later* frame — readiness is
//! polled, never assumed. On devices without `TIMESTAMP_QUERY` the GPU
//! timer is a no-op and every reading stays `None`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rustc_hash::FxHashMap;

/// Named CPU timings, keeping the most recent elapsed milliseconds per name.
#[derive(Debug, Default)]
pub struct CpuTimer {
    timings: FxHashMap<String, f32>,
}

impl CpuTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f`, recording its wall time under `name`.
    pub fn with<R>(&mut self, name: &str, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let result = f();
        self.timings
            .insert(name.to_string(), start.elapsed().as_secs_f32() * 1000.0);
        result
    }

    /// Records an externally measured duration.
    pub fn record(&mut self, name: &str, ms: f32) {
        self.timings.insert(name.to_string(), ms);
    }

    #[must_use]
    pub fn elapsed_ms(&self, name: &str) -> Option<f32> {
        self.timings.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.timings.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

struct GpuTimerInner {
    query_set: wgpu::QuerySet,
    resolve_buffer: wgpu::Buffer,
    readback_buffer: wgpu::Buffer,
    /// Nanoseconds per timestamp tick.
    period: f32,
    names: Vec<String>,
    elapsed_ms: Vec<Option<f32>>,
    /// A readback is in flight; do not touch the buffer until mapped.
    in_flight: bool,
    mapped: Arc<AtomicBool>,
}

/// GPU pass timings through timestamp queries.
///
/// Slots are registered up front; each gets a begin/end timestamp pair
/// written by the render pass it is attached to.
pub struct GpuTimer {
    inner: Option<GpuTimerInner>,
}

impl GpuTimer {
    /// `names` are the passes that will be timed. Degrades to a no-op when
    /// the device lacks timestamp support.
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, names: &[&str]) -> Self {
        if !device.features().contains(wgpu::Features::TIMESTAMP_QUERY) || names.is_empty() {
            log::info!("timestamp queries unsupported; GPU timings disabled");
            return Self { inner: None };
        }

        let count = (names.len() * 2) as u32;
        let query_set = device.create_query_set(&wgpu::QuerySetDescriptor {
            label: Some("gpu timer"),
            ty: wgpu::QueryType::Timestamp,
            count,
        });
        let size = u64::from(count) * 8;
        let resolve_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpu timer resolve"),
            size,
            usage: wgpu::BufferUsages::QUERY_RESOLVE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpu timer readback"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            inner: Some(GpuTimerInner {
                query_set,
                resolve_buffer,
                readback_buffer,
                period: queue.get_timestamp_period(),
                names: names.iter().map(ToString::to_string).collect(),
                elapsed_ms: vec![None; names.len()],
                in_flight: false,
                mapped: Arc::new(AtomicBool::new(false)),
            }),
        }
    }

    /// Timestamp writes for the named pass, or `None` when timing is
    /// disabled or a readback still owns the buffers.
    #[must_use]
    pub fn pass_timestamps(&self, name: &str) -> Option<wgpu::RenderPassTimestampWrites<'_>> {
        let inner = self.inner.as_ref()?;
        if inner.in_flight {
            return None;
        }
        let slot = inner.names.iter().position(|n| n == name)?;
        Some(wgpu::RenderPassTimestampWrites {
            query_set: &inner.query_set,
            beginning_of_pass_write_index: Some((slot * 2) as u32),
            end_of_pass_write_index: Some((slot * 2 + 1) as u32),
        })
    }

    /// Encodes query resolution into `encoder`. Call after the timed passes
    /// of a frame, before submit.
    pub fn resolve(&mut self, encoder: &mut wgpu::CommandEncoder) {
        let Some(inner) = &mut self.inner else { return };
        if inner.in_flight {
            return;
        }
        let count = (inner.names.len() * 2) as u32;
        encoder.resolve_query_set(&inner.query_set, 0..count, &inner.resolve_buffer, 0);
        encoder.copy_buffer_to_buffer(
            &inner.resolve_buffer,
            0,
            &inner.readback_buffer,
            0,
            u64::from(count) * 8,
        );
    }

    /// Kicks off or completes the asynchronous readback. Results show up
    /// whenever the map completes on a later poll; this never blocks.
    pub fn poll(&mut self, device: &wgpu::Device) {
        let Some(inner) = &mut self.inner else { return };

        if !inner.in_flight {
            let mapped = Arc::clone(&inner.mapped);
            inner
                .readback_buffer
                .slice(..)
                .map_async(wgpu::MapMode::Read, move |result| {
                    if result.is_ok() {
                        mapped.store(true, Ordering::Release);
                    }
                });
            inner.in_flight = true;
            return;
        }

        let _ = device.poll(wgpu::PollType::Poll);
        if !inner.mapped.swap(false, Ordering::Acquire) {
            return;
        }

        {
            let view = inner.readback_buffer.slice(..).get_mapped_range();
            let stamps: &[u64] = bytemuck::cast_slice(&view);
            for (slot, elapsed) in inner.elapsed_ms.iter_mut().enumerate() {
                let begin = stamps[slot * 2];
                let end = stamps[slot * 2 + 1];
                if end > begin {
                    *elapsed = Some((end - begin) as f32 * inner.period / 1_000_000.0);
                }
            }
        }
        inner.readback_buffer.unmap();
        inner.in_flight = false;
    }

    /// Most recent reading for a pass, if any has resolved yet.
    #[must_use]
    pub fn elapsed_ms(&self, name: &str) -> Option<f32> {
        let inner = self.inner.as_ref()?;
        let slot = inner.names.iter().position(|n| n == name)?;
        inner.elapsed_ms[slot]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f32>)> {
        self.inner.iter().flat_map(|inner| {
            inner
                .names
                .iter()
                .map(String::as_str)
                .zip(inner.elapsed_ms.iter().copied())
        })
    }
}

/// One merged CPU/GPU timing row for the host's debug display.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingRow {
    pub name: String,
    pub cpu_ms: Option<f32>,
    pub gpu_ms: Option<f32>,
}

/// Merges both timers into display rows, sorted by name.
#[must_use]
pub fn timing_report(cpu: &CpuTimer, gpu: &GpuTimer) -> Vec<TimingRow> {
    let mut rows: FxHashMap<&str, TimingRow> = FxHashMap::default();
    for (name, ms) in cpu.iter() {
        rows.entry(name).or_insert_with(|| TimingRow {
            name: name.to_string(),
            cpu_ms: None,
            gpu_ms: None,
        }).cpu_ms = Some(ms);
    }
    for (name, ms) in gpu.iter() {
        rows.entry(name)
            .or_insert_with(|| TimingRow {
                name: name.to_string(),
                cpu_ms: None,
                gpu_ms: None,
            })
            .gpu_ms = ms;
    }
    let mut rows: Vec<TimingRow> = rows.into_values().collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}
