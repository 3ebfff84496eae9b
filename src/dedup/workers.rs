// Bounded worker pool for the embarrassingly parallel pipeline phases

use crossbeam_channel::bounded;

/// Apply `f` to every input on `width` worker threads, returning results in
/// input order.
///
/// Jobs are tagged with their input index and results land in per-index
/// slots, so worker scheduling never affects the output. A width of 1 (or a
/// single input) degenerates to a plain sequential map.
pub fn parallel_map<T, R, F>(inputs: Vec<T>, width: usize, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let count = inputs.len();
    let width = width.max(1).min(count);

    if width <= 1 {
        return inputs.into_iter().map(f).collect();
    }

    let (job_tx, job_rx) = bounded::<(usize, T)>(count);
    let (result_tx, result_rx) = bounded::<(usize, R)>(count);

    for job in inputs.into_iter().enumerate() {
        // Channel holds `count` slots; sends cannot block or fail here
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    std::thread::scope(|scope| {
        for _ in 0..width {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let f = &f;
            scope.spawn(move || {
                while let Ok((index, input)) = job_rx.recv() {
                    let _ = result_tx.send((index, f(input)));
                }
            });
        }
        drop(result_tx);

        let mut slots: Vec<Option<R>> = (0..count).map(|_| None).collect();
        for (index, result) in result_rx.iter() {
            slots[index] = Some(result);
        }
        slots
            .into_iter()
            .map(|slot| slot.expect("worker completed without a result"))
            .collect()
    })
}
