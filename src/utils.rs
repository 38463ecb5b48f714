//! Conversions from Python arguments to crate types.
#[cfg(feature = "python-bindings")]
use std::{str::FromStr, time::Duration};

#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
    PyReadonlyArray2,
};

#[cfg(feature = "python-bindings")]
use crate::{
    calibration::CalibError,
    data::{RawCell, RawTable},
    optimization::{
        basin_hopping::HopOptions,
        local_search::{LineSearcher, LocalSearchOptions, Theta, Tolerances},
    },
    oracle::{InputAddressing, OracleLayout, PathTemplate, ReactionSlot, LEGACY_LEADING_COUNT},
};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err("expected a 1-D numpy.ndarray or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Parameter vector from a 1-D array-like.
#[cfg(feature = "python-bindings")]
pub fn extract_theta<'py>(py: Python<'py>, raw: &Bound<'py, PyAny>) -> PyResult<Theta> {
    let arr = extract_f64_array(py, raw)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err("initial_params must be a 1-D contiguous float64 array or sequence")
    })?;
    Ok(Array1::from(slice.to_vec()))
}

/// Build a [`RawTable`] from row labels and a `components × cases` matrix.
///
/// Case columns are named by their position.
#[cfg(feature = "python-bindings")]
pub fn extract_raw_table<'py>(
    labels: Vec<String>, values: &Bound<'py, PyAny>, label_column: &str,
) -> PyResult<RawTable> {
    let arr: PyReadonlyArray2<f64> = values.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err("expected a 2-D numpy.ndarray of float64")
    })?;
    let view = arr.as_array();
    if view.nrows() != labels.len() {
        return Err(PyValueError::new_err(format!(
            "{} labels for a matrix with {} rows",
            labels.len(),
            view.nrows()
        )));
    }

    let mut columns = Vec::with_capacity(view.ncols() + 1);
    columns.push(label_column.to_string());
    columns.extend((0..view.ncols()).map(|j| j.to_string()));
    let rows = labels
        .into_iter()
        .zip(view.rows())
        .map(|(label, row)| {
            let mut cells = Vec::with_capacity(row.len() + 1);
            cells.push(RawCell::Text(label));
            cells.extend(row.iter().map(|&v| RawCell::Number(v)));
            cells
        })
        .collect();
    Ok(RawTable::new(columns, rows))
}

#[cfg(feature = "python-bindings")]
pub fn extract_layout(
    pre_exp_path: &str, act_energy_path: &str, slots: Vec<String>, write_base: &str,
    read_base: &str, legacy_leading_base: Option<&str>,
) -> PyResult<OracleLayout> {
    let layout = OracleLayout::new(
        PathTemplate::new(pre_exp_path),
        PathTemplate::new(act_energy_path),
        slots.into_iter().map(ReactionSlot::from).collect(),
        PathTemplate::new(write_base),
        PathTemplate::new(read_base),
    )
    .map_err(CalibError::from)?;
    Ok(match legacy_leading_base {
        Some(base) => layout.with_input_addressing(InputAddressing::Legacy {
            leading_base: PathTemplate::new(base),
            leading_count: LEGACY_LEADING_COUNT,
        }),
        None => layout,
    })
}

#[cfg(feature = "python-bindings")]
pub fn extract_hop_options(
    n_iter: Option<usize>, step_size: Option<f64>, interval: Option<usize>,
    temperature: Option<f64>,
) -> PyResult<HopOptions> {
    let d = HopOptions::default();
    let opts = HopOptions::new(
        n_iter.unwrap_or(d.n_iter),
        step_size.unwrap_or(d.step_size),
        interval.unwrap_or(d.interval),
        temperature.unwrap_or(d.temperature),
        d.target_accept_rate,
        d.step_factor,
        None,
    )
    .map_err(CalibError::from)?;
    Ok(opts)
}

#[cfg(feature = "python-bindings")]
pub fn extract_local_options(
    tol: Option<f64>, max_iter: Option<usize>, line_searcher: Option<&str>,
    lbfgs_mem: Option<usize>,
) -> PyResult<LocalSearchOptions> {
    let tols = match (tol, max_iter) {
        (None, None) => Tolerances::default(),
        (tol, max_iter) => {
            let d = Tolerances::default();
            Tolerances::new(
                tol.or(d.tol_grad),
                tol.or(d.tol_cost),
                max_iter.or(d.max_iter),
            )
            .map_err(CalibError::from)?
        }
    };
    let ls = match line_searcher {
        Some(name) => LineSearcher::from_str(name).map_err(CalibError::from)?,
        None => LineSearcher::MoreThuente,
    };
    let opts = LocalSearchOptions::new(tols, ls, false, lbfgs_mem).map_err(CalibError::from)?;
    Ok(opts)
}

/// Seconds as a [`Duration`], rejecting negative or non-finite values.
#[cfg(feature = "python-bindings")]
pub fn extract_seconds(name: &str, seconds: f64) -> PyResult<Duration> {
    Duration::try_from_secs_f64(seconds).map_err(|_| {
        PyValueError::new_err(format!("{name} must be a finite, non-negative number of seconds"))
    })
}
