//! Equilibrium thermodynamics over the static reaction catalog.
//!
//! Closed-form formulas only: reaction quotient, van 't Hoff temperature
//! dependence of K, Gibbs free energy, and the Le Chatelier shift direction.

use serde::Serialize;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use swarmfield_data::{Reaction, Term};
use thiserror::Error;

/// Molar gas constant in kJ/(mol K).
pub const GAS_CONSTANT_KJ: f64 = 8.314_462_618e-3;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EquilibriumError {
    #[error("no activity given for species {0}")]
    MissingSpecies(String),

    #[error("activity of {species} is negative ({value})")]
    NegativeActivity { species: String, value: f64 },

    #[error("reaction quotient is indeterminate: reactants and products are both absent")]
    Indeterminate,

    #[error("temperature must be a positive finite number of kelvin, got {0}")]
    InvalidTemperature(f64),

    #[error("equilibrium constant must be positive, got {0}")]
    InvalidConstant(f64),

    #[error("reaction quotient must be non-negative, got {0}")]
    InvalidQuotient(f64),
}

pub type Result<T> = std::result::Result<T, EquilibriumError>;

/// Direction a mixture moves to reach equilibrium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Shift {
    /// Q < K: reactants convert to products
    Forward,
    /// Q > K: products convert back
    Reverse,
    AtEquilibrium,
}

fn check_temperature(temperature_k: f64) -> Result<()> {
    if temperature_k.is_finite() && temperature_k > 0.0 {
        Ok(())
    } else {
        Err(EquilibriumError::InvalidTemperature(temperature_k))
    }
}

fn activity_product<K>(terms: &[Term], activities: &HashMap<K, f64>) -> Result<f64>
where
    K: Borrow<str> + Hash + Eq,
{
    terms.iter().try_fold(1.0, |acc, term| {
        let value = *activities
            .get(term.species)
            .ok_or_else(|| EquilibriumError::MissingSpecies(term.species.to_string()))?;
        if value < 0.0 {
            return Err(EquilibriumError::NegativeActivity {
                species: term.species.to_string(),
                value,
            });
        }
        Ok(acc * value.powi(term.coefficient as i32))
    })
}

/// `Q = prod(products^nu) / prod(reactants^nu)`.
///
/// Activities are partial pressures or concentrations, matching the
/// reaction's [`swarmfield_data::ConstantBasis`]. With no reactants present
/// and some products, Q is `+inf`.
pub fn reaction_quotient<K>(reaction: &Reaction, activities: &HashMap<K, f64>) -> Result<f64>
where
    K: Borrow<str> + Hash + Eq,
{
    let numerator = activity_product(reaction.products, activities)?;
    let denominator = activity_product(reaction.reactants, activities)?;
    match (numerator == 0.0, denominator == 0.0) {
        (true, true) => Err(EquilibriumError::Indeterminate),
        (false, true) => Ok(f64::INFINITY),
        _ => Ok(numerator / denominator),
    }
}

/// K at `temperature_k` via the van 't Hoff equation, assuming a constant
/// reaction enthalpy:
///
/// `K(T) = K_ref * exp(-dH / R * (1/T - 1/T_ref))`
pub fn equilibrium_constant_at(reaction: &Reaction, temperature_k: f64) -> Result<f64> {
    check_temperature(temperature_k)?;
    let exponent = -reaction.delta_h_kj_mol / GAS_CONSTANT_KJ
        * (1.0 / temperature_k - 1.0 / reaction.t_ref_k);
    Ok(reaction.k_ref * exponent.exp())
}

/// Compares Q with K. `tolerance` is relative to K.
#[must_use]
pub fn predict_shift(quotient: f64, constant: f64, tolerance: f64) -> Shift {
    if (quotient - constant).abs() <= tolerance * constant {
        Shift::AtEquilibrium
    } else if quotient < constant {
        Shift::Forward
    } else {
        Shift::Reverse
    }
}

/// Standard Gibbs energy change `dG0 = -RT ln K`, in kJ/mol.
pub fn standard_gibbs(constant: f64, temperature_k: f64) -> Result<f64> {
    check_temperature(temperature_k)?;
    if !(constant.is_finite() && constant > 0.0) {
        return Err(EquilibriumError::InvalidConstant(constant));
    }
    Ok(-GAS_CONSTANT_KJ * temperature_k * constant.ln())
}

/// Gibbs energy change of a mixture, `dG = dG0(T) + RT ln Q`, in kJ/mol.
///
/// Negative means the forward reaction is spontaneous.
pub fn reaction_gibbs(reaction: &Reaction, temperature_k: f64, quotient: f64) -> Result<f64> {
    if quotient.is_nan() || quotient < 0.0 {
        return Err(EquilibriumError::InvalidQuotient(quotient));
    }
    let k = equilibrium_constant_at(reaction, temperature_k)?;
    let standard = standard_gibbs(k, temperature_k)?;
    Ok(standard + GAS_CONSTANT_KJ * temperature_k * quotient.ln())
}
