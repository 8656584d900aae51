//! Linear programs over non-negative reals.
//!
//! A [`LinearProgram`] is a set of equality rows over variables that are all
//! constrained to be `>= 0`, plus a cost per variable to minimise. It is
//! solved with a dense two-phase simplex:
//!
//! 1. **Phase one** adds one artificial variable per row and minimises their
//!    sum. A positive optimum means the rows have no non-negative solution.
//! 2. **Phase two** drops the artificials and minimises the real costs from
//!    the feasible basis phase one found.
//!
//! Entering and leaving variables follow Bland's rule (lowest index), which
//! rules out cycling; the pivot count is additionally capped by
//! [`SolverConfig::max_iterations`]. Rows are equilibrated (scaled so their
//! largest coefficient is 1) before solving, and the answer is checked
//! against the unscaled rows afterwards.

use crate::config::SolverConfig;
use std::fmt;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why a program produced no solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SolveError {
    #[error("no non-negative solution satisfies the constraints")]
    Infeasible,
    #[error("numeric overflow while solving")]
    Overflow,
    #[error("iteration limit of {0} pivots reached")]
    IterationLimit(usize),
    #[error("row refers to variable {0}, which was never added")]
    UnknownVariable(usize),
}

// ---------------------------------------------------------------------------
// LinearProgram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Row {
    label: String,
    coeffs: Vec<(usize, f64)>,
    rhs: f64,
}

/// Minimise `costs . x` subject to `A x = b`, `x >= 0`.
#[derive(Debug, Clone, Default)]
pub struct LinearProgram {
    names: Vec<String>,
    costs: Vec<f64>,
    rows: Vec<Row>,
}

impl LinearProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a non-negative variable with the given objective cost. Returns its
    /// column index.
    pub fn add_variable(&mut self, name: impl Into<String>, cost: f64) -> usize {
        self.names.push(name.into());
        self.costs.push(cost);
        self.costs.len() - 1
    }

    /// Add the row `sum(coeff * x[var]) = rhs`. Repeated variables are summed.
    /// Every `var` must come from [`LinearProgram::add_variable`]; `solve`
    /// rejects rows that name anything else.
    pub fn add_equality(&mut self, label: impl Into<String>, coeffs: Vec<(usize, f64)>, rhs: f64) {
        self.rows.push(Row {
            label: label.into(),
            coeffs,
            rhs,
        });
    }

    pub fn variable_count(&self) -> usize {
        self.costs.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.rows.len()
    }

    /// Solve the program. `scale_hint` (>= 1) is the magnitude spread expected
    /// between coefficients; it loosens the feasibility tolerance and tightens
    /// the pivot tolerance accordingly.
    pub fn solve(&self, config: &SolverConfig, scale_hint: f64) -> Result<Vec<f64>, SolveError> {
        let n = self.costs.len();
        let m = self.rows.len();
        let hint = if scale_hint.is_finite() && scale_hint > 1.0 {
            scale_hint
        } else {
            1.0
        };
        let pivot_tol = config.epsilon / hint;

        if self.costs.iter().any(|c| !c.is_finite()) {
            return Err(SolveError::Overflow);
        }
        if let Some(&(j, _)) = self
            .rows
            .iter()
            .flat_map(|r| &r.coeffs)
            .find(|&&(j, _)| j >= n)
        {
            return Err(SolveError::UnknownVariable(j));
        }
        if m == 0 {
            // Non-negative costs are minimised at the origin.
            return Ok(vec![0.0; n]);
        }

        let mut tableau = Tableau::new(n, m);
        let mut max_rhs: f64 = 1.0;

        for (i, row) in self.rows.iter().enumerate() {
            if !row.rhs.is_finite() {
                return Err(SolveError::Overflow);
            }
            let mut dense = vec![0.0; n];
            for &(j, a) in &row.coeffs {
                if !a.is_finite() {
                    return Err(SolveError::Overflow);
                }
                dense[j] += a;
            }

            let scale = dense.iter().fold(0.0f64, |acc, a| acc.max(a.abs()));
            let mut rhs = row.rhs;
            if scale > 0.0 {
                dense.iter_mut().for_each(|a| *a /= scale);
                rhs /= scale;
            }
            if rhs < 0.0 {
                dense.iter_mut().for_each(|a| *a = -*a);
                rhs = -rhs;
            }
            if !rhs.is_finite() {
                return Err(SolveError::Overflow);
            }
            max_rhs = max_rhs.max(rhs);
            tableau.load_row(i, &dense, rhs);
        }

        let feas_tol = config.epsilon * hint * max_rhs;

        // Phase one: minimise the artificial sum.
        tableau.load_phase_one_objective();
        tableau.run(n + m, pivot_tol, config.max_iterations)?;
        if tableau.objective_value() > feas_tol * m as f64 {
            return Err(SolveError::Infeasible);
        }
        tableau.evict_artificials(pivot_tol)?;

        // Phase two: minimise the real costs over structural columns only.
        tableau.load_phase_two_objective(&self.costs);
        tableau.run(n, pivot_tol, config.max_iterations)?;

        let mut x = tableau.basic_solution();
        for v in &mut x {
            if !v.is_finite() {
                return Err(SolveError::Overflow);
            }
            if *v < -feas_tol {
                return Err(SolveError::Infeasible);
            }
            if v.abs() <= feas_tol {
                *v = 0.0;
            }
        }

        self.check_residuals(&x, config.epsilon * hint)?;
        Ok(x)
    }

    /// Verify `x` against the unscaled rows.
    fn check_residuals(&self, x: &[f64], tol: f64) -> Result<(), SolveError> {
        for row in &self.rows {
            let mut lhs = 0.0;
            let mut magnitude = row.rhs.abs().max(1.0);
            for &(j, a) in &row.coeffs {
                let term = a * x[j];
                lhs += term;
                magnitude = magnitude.max(term.abs());
            }
            if !lhs.is_finite() {
                return Err(SolveError::Overflow);
            }
            if (lhs - row.rhs).abs() > tol * 1e3 * magnitude {
                return Err(SolveError::Infeasible);
            }
        }
        Ok(())
    }
}

impl fmt::Display for LinearProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "minimise")?;
        for (name, cost) in self.names.iter().zip(&self.costs) {
            if *cost != 0.0 {
                write!(f, " + {cost}*{name}")?;
            }
        }
        writeln!(f)?;
        for row in &self.rows {
            write!(f, "  {}:", row.label)?;
            for &(j, a) in &row.coeffs {
                match self.names.get(j) {
                    Some(name) => write!(f, " {a:+}*{name}")?,
                    None => write!(f, " {a:+}*?{j}")?,
                }
            }
            writeln!(f, " = {}", row.rhs)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tableau
// ---------------------------------------------------------------------------

/// Dense simplex tableau: `m` rows of `[A | I | b]` plus the reduced-cost row.
struct Tableau {
    rows: Vec<Vec<f64>>,
    objective: Vec<f64>,
    basis: Vec<usize>,
    structural: usize,
    iterations: usize,
}

impl Tableau {
    fn new(structural: usize, constraints: usize) -> Self {
        let width = structural + constraints + 1;
        Self {
            rows: vec![vec![0.0; width]; constraints],
            objective: vec![0.0; width],
            basis: (structural..structural + constraints).collect(),
            structural,
            iterations: 0,
        }
    }

    fn rhs_col(&self) -> usize {
        self.objective.len() - 1
    }

    fn load_row(&mut self, i: usize, coeffs: &[f64], rhs: f64) {
        let rhs_col = self.rhs_col();
        let row = &mut self.rows[i];
        row[..coeffs.len()].copy_from_slice(coeffs);
        row[self.structural + i] = 1.0;
        row[rhs_col] = rhs;
    }

    fn load_phase_one_objective(&mut self) {
        self.objective.iter_mut().for_each(|v| *v = 0.0);
        let rhs_col = self.rhs_col();
        for row in &self.rows {
            for j in 0..self.structural {
                self.objective[j] -= row[j];
            }
            self.objective[rhs_col] -= row[rhs_col];
        }
    }

    fn load_phase_two_objective(&mut self, costs: &[f64]) {
        self.objective.iter_mut().for_each(|v| *v = 0.0);
        self.objective[..costs.len()].copy_from_slice(costs);
        for (i, &b) in self.basis.iter().enumerate() {
            if b >= self.structural {
                continue;
            }
            let c = self.objective[b];
            if c != 0.0 {
                for (o, r) in self.objective.iter_mut().zip(&self.rows[i]) {
                    *o -= c * r;
                }
            }
        }
    }

    /// Current objective value (the reduced-cost row stores its negation).
    fn objective_value(&self) -> f64 {
        -self.objective[self.rhs_col()]
    }

    /// Pivot until no column below `allowed` has a negative reduced cost.
    fn run(&mut self, allowed: usize, pivot_tol: f64, max_iterations: usize) -> Result<(), SolveError> {
        let rhs_col = self.rhs_col();
        loop {
            let Some(col) = (0..allowed).find(|&j| self.objective[j] < -pivot_tol) else {
                return Ok(());
            };

            let mut leave: Option<(usize, f64)> = None;
            for (i, row) in self.rows.iter().enumerate() {
                let a = row[col];
                if a <= pivot_tol {
                    continue;
                }
                let ratio = row[rhs_col] / a;
                leave = match leave {
                    None => Some((i, ratio)),
                    Some((best, best_ratio)) => {
                        let tie = (ratio - best_ratio).abs() <= pivot_tol;
                        if (tie && self.basis[i] < self.basis[best])
                            || (!tie && ratio < best_ratio)
                        {
                            Some((i, ratio))
                        } else {
                            Some((best, best_ratio))
                        }
                    }
                };
            }

            // Unbounded direction. Impossible with non-negative costs, but an
            // answer we cannot use either way.
            let Some((row, _)) = leave else {
                return Err(SolveError::Infeasible);
            };

            if self.iterations >= max_iterations {
                return Err(SolveError::IterationLimit(max_iterations));
            }
            self.iterations += 1;
            self.pivot(row, col)?;
        }
    }

    fn pivot(&mut self, row: usize, col: usize) -> Result<(), SolveError> {
        let p = self.rows[row][col];
        self.rows[row].iter_mut().for_each(|v| *v /= p);
        let pivot_row = self.rows[row].clone();

        for (i, r) in self.rows.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let f = r[col];
            if f != 0.0 {
                for (v, pv) in r.iter_mut().zip(&pivot_row) {
                    *v -= f * pv;
                }
            }
        }
        let f = self.objective[col];
        if f != 0.0 {
            for (v, pv) in self.objective.iter_mut().zip(&pivot_row) {
                *v -= f * pv;
            }
        }
        self.basis[row] = col;

        let rhs_col = self.rhs_col();
        if !self.objective[rhs_col].is_finite() || self.rows.iter().any(|r| !r[rhs_col].is_finite()) {
            return Err(SolveError::Overflow);
        }
        Ok(())
    }

    /// Pivot artificial variables still basic (at zero) out of the basis.
    /// Rows with no structural coefficient left are redundant and keep their
    /// artificial, which no later pivot can touch.
    fn evict_artificials(&mut self, pivot_tol: f64) -> Result<(), SolveError> {
        for i in 0..self.rows.len() {
            if self.basis[i] < self.structural {
                continue;
            }
            if let Some(col) = (0..self.structural).find(|&j| self.rows[i][j].abs() > pivot_tol) {
                self.pivot(i, col)?;
            }
        }
        Ok(())
    }

    fn basic_solution(&self) -> Vec<f64> {
        let rhs_col = self.rhs_col();
        let mut x = vec![0.0; self.structural];
        for (i, &b) in self.basis.iter().enumerate() {
            if b < self.structural {
                x[b] = self.rows[i][rhs_col];
            }
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SolverConfig {
        SolverConfig::default()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn empty_program_is_origin() {
        let mut lp = LinearProgram::new();
        lp.add_variable("x", 1.0);
        assert_eq!(lp.solve(&config(), 1.0).unwrap(), vec![0.0]);
    }

    #[test]
    fn chain_of_equalities() {
        // x = 10, y = 2x, z = y / 4
        let mut lp = LinearProgram::new();
        let x = lp.add_variable("x", 1.0);
        let y = lp.add_variable("y", 1.0);
        let z = lp.add_variable("z", 1.0);
        lp.add_equality("fix", vec![(x, 1.0)], 10.0);
        lp.add_equality("double", vec![(y, 1.0), (x, -2.0)], 0.0);
        lp.add_equality("quarter", vec![(z, 4.0), (y, -1.0)], 0.0);

        let sol = lp.solve(&config(), 1.0).unwrap();
        assert!(close(sol[x], 10.0));
        assert!(close(sol[y], 20.0));
        assert!(close(sol[z], 5.0));
    }

    #[test]
    fn contradictory_rows_are_infeasible() {
        let mut lp = LinearProgram::new();
        let x = lp.add_variable("x", 1.0);
        lp.add_equality("a", vec![(x, 1.0)], 10.0);
        lp.add_equality("b", vec![(x, 1.0)], 5.0);
        assert_eq!(lp.solve(&config(), 1.0), Err(SolveError::Infeasible));
    }

    #[test]
    fn negative_requirement_is_infeasible() {
        let mut lp = LinearProgram::new();
        let x = lp.add_variable("x", 1.0);
        lp.add_equality("neg", vec![(x, 1.0)], -3.0);
        assert_eq!(lp.solve(&config(), 1.0), Err(SolveError::Infeasible));
    }

    #[test]
    fn homogeneous_system_minimises_to_zero() {
        // x = y, y = x: any scale works, the objective picks zero.
        let mut lp = LinearProgram::new();
        let x = lp.add_variable("x", 1.0);
        let y = lp.add_variable("y", 1.0);
        lp.add_equality("xy", vec![(x, 1.0), (y, -1.0)], 0.0);
        lp.add_equality("yx", vec![(y, 1.0), (x, -1.0)], 0.0);
        assert_eq!(lp.solve(&config(), 1.0).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn redundant_rows_tolerated() {
        let mut lp = LinearProgram::new();
        let x = lp.add_variable("x", 1.0);
        let y = lp.add_variable("y", 0.0);
        lp.add_equality("sum", vec![(x, 1.0), (y, 1.0)], 4.0);
        lp.add_equality("sum-again", vec![(x, 2.0), (y, 2.0)], 8.0);
        lp.add_equality("empty", vec![], 0.0);
        let sol = lp.solve(&config(), 1.0).unwrap();
        assert!(close(sol[x] + sol[y], 4.0));
        // x costs, y is free: all of it goes to y.
        assert!(close(sol[y], 4.0));
    }

    #[test]
    fn empty_row_with_rhs_is_infeasible() {
        let mut lp = LinearProgram::new();
        lp.add_variable("x", 1.0);
        lp.add_equality("impossible", vec![], 1.0);
        assert_eq!(lp.solve(&config(), 1.0), Err(SolveError::Infeasible));
    }

    #[test]
    fn non_finite_input_reports_overflow() {
        let mut lp = LinearProgram::new();
        let x = lp.add_variable("x", 1.0);
        lp.add_equality("inf", vec![(x, 1.0)], f64::INFINITY);
        assert_eq!(lp.solve(&config(), 1.0), Err(SolveError::Overflow));

        let mut lp = LinearProgram::new();
        let x = lp.add_variable("x", 1.0);
        lp.add_equality("nan", vec![(x, f64::NAN)], 1.0);
        assert_eq!(lp.solve(&config(), 1.0), Err(SolveError::Overflow));
    }

    #[test]
    fn iteration_limit_bounds_work() {
        let mut lp = LinearProgram::new();
        let x = lp.add_variable("x", 1.0);
        lp.add_equality("fix", vec![(x, 1.0)], 1.0);
        let tight = SolverConfig {
            max_iterations: 0,
            ..SolverConfig::default()
        };
        assert_eq!(lp.solve(&tight, 1.0), Err(SolveError::IterationLimit(0)));
    }

    #[test]
    fn wide_magnitudes_solve_with_hint() {
        let mut lp = LinearProgram::new();
        let x = lp.add_variable("x", 1.0);
        let y = lp.add_variable("y", 1.0);
        lp.add_equality("fix", vec![(x, 1.0)], 0.001);
        lp.add_equality("ratio", vec![(y, 1.0), (x, -50_000.0)], 0.0);
        let sol = lp.solve(&config(), 50_000.0).unwrap();
        assert!(close(sol[y], 50.0));
    }

    #[test]
    fn repeated_solves_are_bit_identical() {
        let mut lp = LinearProgram::new();
        let x = lp.add_variable("x", 1.0);
        let y = lp.add_variable("y", 1.0);
        let z = lp.add_variable("z", 0.0);
        lp.add_equality("fix", vec![(x, 3.0)], 7.0);
        lp.add_equality("split", vec![(y, 1.0), (z, 1.0), (x, -1.3)], 0.0);
        let a = lp.solve(&config(), 1.0).unwrap();
        let b = lp.solve(&config(), 1.0).unwrap();
        assert_eq!(
            a.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            b.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn row_with_unknown_variable_rejected() {
        let mut lp = LinearProgram::new();
        let x = lp.add_variable("x", 1.0);
        lp.add_equality("fix", vec![(x, 1.0)], 1.0);
        lp.add_equality("stray", vec![(x, 1.0), (5, 2.0)], 0.0);
        assert_eq!(lp.solve(&config(), 1.0), Err(SolveError::UnknownVariable(5)));

        // Also caught when there is nothing else to solve.
        let mut empty = LinearProgram::new();
        empty.add_equality("stray", vec![(0, 1.0)], 1.0);
        assert_eq!(empty.solve(&config(), 1.0), Err(SolveError::UnknownVariable(0)));
    }

    #[test]
    fn display_lists_rows() {
        let mut lp = LinearProgram::new();
        let x = lp.add_variable("x", 1.0);
        lp.add_equality("fix", vec![(x, 1.0)], 2.0);
        let text = lp.to_string();
        assert!(text.contains("fix: +1*x = 2"), "got: {text}");
    }
}
