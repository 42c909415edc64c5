// Copyright © SurrealDB Ltd
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use washbay::{AdmissionPolicy, Clock, Request, Semaphore, Stats, WaitingArea};

// Helper function to create an instrumented semaphore
fn semaphore(permits: usize) -> Semaphore {
	Semaphore::new(permits, Arc::new(Stats::new()))
}

fn bench_semaphore(c: &mut Criterion) {
	let mut group = c.benchmark_group("semaphore");
	group.throughput(Throughput::Elements(1));

	group.bench_function("acquire_release", |b| {
		let sem = semaphore(1);
		b.iter(|| {
			sem.acquire();
			sem.release();
		});
	});

	group.bench_function("acquire_permit", |b| {
		let sem = semaphore(1);
		b.iter(|| {
			let permit = sem.acquire_permit();
			black_box(&permit);
		});
	});

	group.bench_function("try_acquire_contended", |b| {
		let sem = semaphore(0);
		b.iter(|| black_box(sem.try_acquire()));
	});

	group.finish();
}

fn bench_waiting_area(c: &mut Criterion) {
	let mut group = c.benchmark_group("waiting_area");
	group.throughput(Throughput::Elements(1));

	group.bench_function("push_pop", |b| {
		let stats = Arc::new(Stats::new());
		let area = WaitingArea::new(8, AdmissionPolicy::Block, stats.clone());
		let request = Arc::new(Request::new("Car-1", stats));
		b.iter(|| {
			area.push(request.clone()).unwrap();
			black_box(area.pop().unwrap());
		});
	});

	group.bench_function("snapshot", |b| {
		let stats = Arc::new(Stats::new());
		let area = WaitingArea::new(8, AdmissionPolicy::Block, stats.clone());
		for id in 0..8 {
			area.push(Arc::new(Request::new(format!("Car-{id}"), stats.clone()))).unwrap();
		}
		b.iter(|| black_box(area.snapshot()));
	});

	group.finish();
}

fn bench_clock(c: &mut Criterion) {
	let mut group = c.benchmark_group("clock");
	group.throughput(Throughput::Elements(1));

	group.bench_function("next_stamp", |b| {
		let clock = Clock::new();
		b.iter(|| black_box(clock.next_stamp()));
	});

	group.finish();
}

criterion_group!(benches, bench_semaphore, bench_waiting_area, bench_clock);
criterion_main!(benches);
