//! Python-style index and slice resolution over one axis.

/// Resolve a single index; negatives count from the end. Out of range is an error.
pub(crate) fn resolve_index(index: i64, len: usize) -> Result<usize, String> {
    let n = len as i64;
    let i = if index < 0 { index + n } else { index };
    if (0..n).contains(&i) {
        Ok(i as usize)
    } else {
        Err(format!("index {index} out of range for axis of length {len}"))
    }
}

/// Resolve `start:stop:step` to the selected positions. Bounds clamp to the axis.
pub(crate) fn resolve_slice(
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
    len: usize,
) -> Result<Vec<usize>, String> {
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err("slice step cannot be zero".to_owned());
    }
    let n = len as i64;

    let adjust = |v: i64, lo: i64, hi: i64| {
        let v = if v < 0 { v + n } else { v };
        v.clamp(lo, hi)
    };

    let mut out = Vec::new();
    if step > 0 {
        let start = start.map_or(0, |v| adjust(v, 0, n));
        let stop = stop.map_or(n, |v| adjust(v, 0, n));
        let mut i = start;
        while i < stop {
            out.push(i as usize);
            i += step;
        }
    } else {
        let start = start.map_or(n - 1, |v| adjust(v, -1, n - 1));
        let stop = stop.map_or(-1, |v| adjust(v, -1, n - 1));
        let mut i = start;
        while i > stop {
            out.push(i as usize);
            i += step;
        }
    }
    Ok(out)
}

/// Every position of the axis.
pub(crate) fn full(len: usize) -> Vec<usize> {
    (0..len).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/script/slice.rs"]
mod tests;
