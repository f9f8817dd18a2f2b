//! Static reaction catalog.
//!
//! Constants are standard-state textbook values. `k_ref` is the equilibrium
//! constant at `t_ref_k`; `delta_h_kj_mol` is the standard reaction enthalpy
//! used for van 't Hoff extrapolation.

use serde::Serialize;

/// Which quantity the equilibrium constant is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConstantBasis {
    /// Partial pressures in atm.
    Pressure,
    /// Molar concentrations.
    Concentration,
}

/// One species with its stoichiometric coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Term {
    pub species: &'static str,
    pub coefficient: u32,
}

impl Term {
    pub const fn new(species: &'static str, coefficient: u32) -> Self {
        Self {
            species,
            coefficient,
        }
    }
}

/// A reversible reaction and its reference thermodynamic data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reaction {
    pub id: &'static str,
    pub name: &'static str,
    pub equation: &'static str,
    pub reactants: &'static [Term],
    pub products: &'static [Term],
    pub k_ref: f64,
    pub t_ref_k: f64,
    pub delta_h_kj_mol: f64,
    pub basis: ConstantBasis,
}

impl Reaction {
    #[must_use]
    pub fn is_exothermic(&self) -> bool {
        self.delta_h_kj_mol < 0.0
    }

    /// Change in total moles across the reaction (products minus reactants).
    #[must_use]
    pub fn mole_change(&self) -> i64 {
        let sum = |terms: &[Term]| terms.iter().map(|t| i64::from(t.coefficient)).sum::<i64>();
        sum(self.products) - sum(self.reactants)
    }

    /// All species appearing on either side, reactants first.
    pub fn species(&self) -> impl Iterator<Item = &'static str> {
        self.reactants
            .iter()
            .chain(self.products.iter())
            .map(|t| t.species)
    }
}

static REACTIONS: &[Reaction] = &[
    Reaction {
        id: "haber",
        name: "Haber process",
        equation: "N2 + 3H2 <=> 2NH3",
        reactants: &[Term::new("N2", 1), Term::new("H2", 3)],
        products: &[Term::new("NH3", 2)],
        k_ref: 6.0e5,
        t_ref_k: 298.15,
        delta_h_kj_mol: -92.2,
        basis: ConstantBasis::Pressure,
    },
    Reaction {
        id: "no2-dimerization",
        name: "Nitrogen dioxide dimerization",
        equation: "2NO2 <=> N2O4",
        reactants: &[Term::new("NO2", 2)],
        products: &[Term::new("N2O4", 1)],
        k_ref: 6.7,
        t_ref_k: 298.15,
        delta_h_kj_mol: -57.2,
        basis: ConstantBasis::Pressure,
    },
    Reaction {
        id: "hydrogen-iodide",
        name: "Hydrogen iodide synthesis",
        equation: "H2 + I2 <=> 2HI",
        reactants: &[Term::new("H2", 1), Term::new("I2", 1)],
        products: &[Term::new("HI", 2)],
        k_ref: 54.3,
        t_ref_k: 703.15,
        delta_h_kj_mol: -9.4,
        basis: ConstantBasis::Concentration,
    },
    Reaction {
        id: "water-gas-shift",
        name: "Water-gas shift",
        equation: "CO + H2O <=> CO2 + H2",
        reactants: &[Term::new("CO", 1), Term::new("H2O", 1)],
        products: &[Term::new("CO2", 1), Term::new("H2", 1)],
        k_ref: 1.0e5,
        t_ref_k: 298.15,
        delta_h_kj_mol: -41.2,
        basis: ConstantBasis::Pressure,
    },
    Reaction {
        id: "contact",
        name: "Contact process",
        equation: "2SO2 + O2 <=> 2SO3",
        reactants: &[Term::new("SO2", 2), Term::new("O2", 1)],
        products: &[Term::new("SO3", 2)],
        k_ref: 7.6e24,
        t_ref_k: 298.15,
        delta_h_kj_mol: -197.8,
        basis: ConstantBasis::Pressure,
    },
    Reaction {
        id: "nitric-oxide",
        name: "Nitric oxide formation",
        equation: "N2 + O2 <=> 2NO",
        reactants: &[Term::new("N2", 1), Term::new("O2", 1)],
        products: &[Term::new("NO", 2)],
        k_ref: 4.7e-31,
        t_ref_k: 298.15,
        delta_h_kj_mol: 180.6,
        basis: ConstantBasis::Pressure,
    },
];

/// Every reaction in the catalog.
#[must_use]
pub fn catalog() -> &'static [Reaction] {
    REACTIONS
}

/// Looks a reaction up by id or display name, ignoring ASCII case.
#[must_use]
pub fn find(name: &str) -> Option<&'static Reaction> {
    REACTIONS
        .iter()
        .find(|r| r.id.eq_ignore_ascii_case(name) || r.name.eq_ignore_ascii_case(name))
}

/// Reactions matching `predicate`, in catalog order.
pub fn filter<P>(predicate: P) -> impl Iterator<Item = &'static Reaction>
where
    P: Fn(&Reaction) -> bool,
{
    REACTIONS.iter().filter(move |r| predicate(r))
}
