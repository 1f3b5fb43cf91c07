//! Option registries
//!
//! Every method the front end can select is a variant of one of four closed
//! enumerations. Names are matched exactly; anything else is rejected with
//! [`ExplorerError::UnknownOption`].

use std::fmt;

use serde::Serialize;

use crate::error::ExplorerError;

/// Which registry an option name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Generator,
    Dynamics,
    Reconstruction,
    Distance,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKind::Generator => write!(f, "generator"),
            OptionKind::Dynamics => write!(f, "dynamics"),
            OptionKind::Reconstruction => write!(f, "reconstruction"),
            OptionKind::Distance => write!(f, "distance"),
        }
    }
}

fn unknown(kind: OptionKind, name: &str) -> ExplorerError {
    ExplorerError::UnknownOption {
        kind,
        name: name.to_string(),
    }
}

/// Network generators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    RingOfCliques,
    BarabasiAlbert,
    ErdosRenyi,
    RandomGeometric,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 4] = [
        GeneratorKind::RingOfCliques,
        GeneratorKind::BarabasiAlbert,
        GeneratorKind::ErdosRenyi,
        GeneratorKind::RandomGeometric,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GeneratorKind::RingOfCliques => "Ring of Cliques",
            GeneratorKind::BarabasiAlbert => "Barabasi Albert Graph",
            GeneratorKind::ErdosRenyi => "Erdos Renyi Graph",
            GeneratorKind::RandomGeometric => "Random Geometric Graph",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ExplorerError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| unknown(OptionKind::Generator, name))
    }

    /// Whether the second parameter is a real number rather than a count
    pub fn takes_real_parameter(&self) -> bool {
        matches!(
            self,
            GeneratorKind::ErdosRenyi | GeneratorKind::RandomGeometric
        )
    }
}

/// Dynamical processes run on a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynamicsKind {
    SherringtonKirkpatrickIsing,
    BranchingModel,
    VoterModel,
    SingleUnbiasedRandomWalker,
    IsingGlauber,
}

impl DynamicsKind {
    pub const ALL: [DynamicsKind; 5] = [
        DynamicsKind::SherringtonKirkpatrickIsing,
        DynamicsKind::BranchingModel,
        DynamicsKind::VoterModel,
        DynamicsKind::SingleUnbiasedRandomWalker,
        DynamicsKind::IsingGlauber,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DynamicsKind::SherringtonKirkpatrickIsing => "Sherrington Kirkpatrick Ising",
            DynamicsKind::BranchingModel => "Branching Model",
            DynamicsKind::VoterModel => "Voter Model",
            DynamicsKind::SingleUnbiasedRandomWalker => "Single Unbiased Random Walker",
            DynamicsKind::IsingGlauber => "Ising Glauber",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ExplorerError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| unknown(OptionKind::Dynamics, name))
    }
}

/// Network reconstruction methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReconstructionKind {
    Random,
    CorrelationMatrix,
    FreeEnergyMinimization,
    PartialCorrelationMatrix,
    PartialCorrelationInfluence,
    NaiveMeanField,
    ThoulessAndersonPalmer,
    ExactMeanField,
    MaximumLikelihoodEstimation,
    ConvergentCrossMapping,
    MutualInformationMatrix,
    OuInference,
    GraphicalLasso,
    MarchenkoPastur,
    TimeGrangerCausality,
    CorrelationSpanningTree,
}

impl ReconstructionKind {
    pub const ALL: [ReconstructionKind; 16] = [
        ReconstructionKind::Random,
        ReconstructionKind::CorrelationMatrix,
        ReconstructionKind::FreeEnergyMinimization,
        ReconstructionKind::PartialCorrelationMatrix,
        ReconstructionKind::PartialCorrelationInfluence,
        ReconstructionKind::NaiveMeanField,
        ReconstructionKind::ThoulessAndersonPalmer,
        ReconstructionKind::ExactMeanField,
        ReconstructionKind::MaximumLikelihoodEstimation,
        ReconstructionKind::ConvergentCrossMapping,
        ReconstructionKind::MutualInformationMatrix,
        ReconstructionKind::OuInference,
        ReconstructionKind::GraphicalLasso,
        ReconstructionKind::MarchenkoPastur,
        ReconstructionKind::TimeGrangerCausality,
        ReconstructionKind::CorrelationSpanningTree,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ReconstructionKind::Random => "Random",
            ReconstructionKind::CorrelationMatrix => "Correlation Matrix",
            ReconstructionKind::FreeEnergyMinimization => "Free Energy Minimization",
            ReconstructionKind::PartialCorrelationMatrix => "Partial Correlation Matrix",
            ReconstructionKind::PartialCorrelationInfluence => "Partial Correlation Influence",
            ReconstructionKind::NaiveMeanField => "Naive Mean Field",
            ReconstructionKind::ThoulessAndersonPalmer => "Thouless Anderson Palmer",
            ReconstructionKind::ExactMeanField => "Exact Mean Field",
            ReconstructionKind::MaximumLikelihoodEstimation => "Maximum Likelihood Estimation",
            ReconstructionKind::ConvergentCrossMapping => "Convergent Cross Mapping",
            ReconstructionKind::MutualInformationMatrix => "Mutual Information Matrix",
            ReconstructionKind::OuInference => "OU Inference",
            ReconstructionKind::GraphicalLasso => "Graphical Lasso",
            ReconstructionKind::MarchenkoPastur => "Marchenko Pastur",
            ReconstructionKind::TimeGrangerCausality => "Time Granger Causality",
            ReconstructionKind::CorrelationSpanningTree => "Correlation Spanning Tree",
        }
    }

    /// Misspelled names the bundled front end still sends
    fn legacy_name(&self) -> Option<&'static str> {
        match self {
            ReconstructionKind::MaximumLikelihoodEstimation => Some("Maxium Likelihood Estimation"),
            ReconstructionKind::ConvergentCrossMapping => Some("Covergent Cross Mapping"),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ExplorerError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name || kind.legacy_name() == Some(name))
            .ok_or_else(|| unknown(OptionKind::Reconstruction, name))
    }
}

/// Graph distance metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistanceKind {
    Jaccard,
    Hamming,
    Frobenius,
    PortraitDivergence,
    IpsenMikhailov,
    HammingIpsenMikhailov,
    ResistancePerturbation,
    NetSimile,
    PolynomialDissimilarity,
    OnionDivergence,
    QuantumSpectralJsd,
    DegreeDivergence,
    NetLsd,
    CommunicabilitySequence,
    NonBacktrackingDistance,
    DeltaCon,
    LaplacianSpectral,
}

impl DistanceKind {
    pub const ALL: [DistanceKind; 17] = [
        DistanceKind::Jaccard,
        DistanceKind::Hamming,
        DistanceKind::Frobenius,
        DistanceKind::PortraitDivergence,
        DistanceKind::IpsenMikhailov,
        DistanceKind::HammingIpsenMikhailov,
        DistanceKind::ResistancePerturbation,
        DistanceKind::NetSimile,
        DistanceKind::PolynomialDissimilarity,
        DistanceKind::OnionDivergence,
        DistanceKind::QuantumSpectralJsd,
        DistanceKind::DegreeDivergence,
        DistanceKind::NetLsd,
        DistanceKind::CommunicabilitySequence,
        DistanceKind::NonBacktrackingDistance,
        DistanceKind::DeltaCon,
        DistanceKind::LaplacianSpectral,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DistanceKind::Jaccard => "Jaccard",
            DistanceKind::Hamming => "Hamming",
            DistanceKind::Frobenius => "Frobenius",
            DistanceKind::PortraitDivergence => "Portrait Divergence",
            DistanceKind::IpsenMikhailov => "Ipsen Mikhailov",
            DistanceKind::HammingIpsenMikhailov => "Hamming Ipsen Mikhailov",
            DistanceKind::ResistancePerturbation => "Resistance Perturbation",
            DistanceKind::NetSimile => "Net Simile",
            DistanceKind::PolynomialDissimilarity => "Polynomial Dissimilarity",
            DistanceKind::OnionDivergence => "Onion Divergence",
            DistanceKind::QuantumSpectralJsd => "Quantum Spectral JSD",
            DistanceKind::DegreeDivergence => "Degree Divergence",
            DistanceKind::NetLsd => "Net LSD",
            DistanceKind::CommunicabilitySequence => "Communicability Sequence",
            DistanceKind::NonBacktrackingDistance => "Non Backtracking Distance",
            DistanceKind::DeltaCon => "Delta Con",
            DistanceKind::LaplacianSpectral => "Laplacian Spectral",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ExplorerError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| unknown(OptionKind::Distance, name))
    }

    /// Metrics that compare matrices entry by entry and therefore need both
    /// graphs to have the same number of nodes, aligned by position
    pub fn requires_alignment(&self) -> bool {
        matches!(
            self,
            DistanceKind::Hamming
                | DistanceKind::Frobenius
                | DistanceKind::HammingIpsenMikhailov
                | DistanceKind::ResistancePerturbation
                | DistanceKind::PolynomialDissimilarity
                | DistanceKind::QuantumSpectralJsd
                | DistanceKind::CommunicabilitySequence
                | DistanceKind::DeltaCon
        )
    }
}

/// Every selectable option name, per registry
#[derive(Debug, Clone, Serialize)]
pub struct OptionCatalog {
    pub generators: Vec<&'static str>,
    pub dynamics: Vec<&'static str>,
    pub reconstruction: Vec<&'static str>,
    pub distance: Vec<&'static str>,
}

pub fn catalog() -> OptionCatalog {
    OptionCatalog {
        generators: GeneratorKind::ALL.iter().map(GeneratorKind::name).collect(),
        dynamics: DynamicsKind::ALL.iter().map(DynamicsKind::name).collect(),
        reconstruction: ReconstructionKind::ALL
            .iter()
            .map(ReconstructionKind::name)
            .collect(),
        distance: DistanceKind::ALL.iter().map(DistanceKind::name).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for kind in GeneratorKind::ALL {
            assert_eq!(GeneratorKind::from_name(kind.name()).unwrap(), kind);
        }
        for kind in DynamicsKind::ALL {
            assert_eq!(DynamicsKind::from_name(kind.name()).unwrap(), kind);
        }
        for kind in ReconstructionKind::ALL {
            assert_eq!(ReconstructionKind::from_name(kind.name()).unwrap(), kind);
        }
        for kind in DistanceKind::ALL {
            assert_eq!(DistanceKind::from_name(kind.name()).unwrap(), kind);
        }
    }

    #[test]
    fn test_legacy_spellings() {
        assert_eq!(
            ReconstructionKind::from_name("Maxium Likelihood Estimation").unwrap(),
            ReconstructionKind::MaximumLikelihoodEstimation
        );
        assert_eq!(
            ReconstructionKind::from_name("Covergent Cross Mapping").unwrap(),
            ReconstructionKind::ConvergentCrossMapping
        );
    }

    #[test]
    fn test_unknown_names() {
        let cases = [
            GeneratorKind::from_name("Lattice").map(|_| ()),
            DynamicsKind::from_name("Kuramoto").map(|_| ()),
            ReconstructionKind::from_name("Oracle").map(|_| ()),
            DistanceKind::from_name("jaccard").map(|_| ()),
        ];
        let kinds = [
            OptionKind::Generator,
            OptionKind::Dynamics,
            OptionKind::Reconstruction,
            OptionKind::Distance,
        ];
        for (result, expected) in cases.into_iter().zip(kinds) {
            match result {
                Err(ExplorerError::UnknownOption { kind, .. }) => assert_eq!(kind, expected),
                other => panic!("expected unknown option, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_real_parameter_generators() {
        assert!(GeneratorKind::ErdosRenyi.takes_real_parameter());
        assert!(GeneratorKind::RandomGeometric.takes_real_parameter());
        assert!(!GeneratorKind::RingOfCliques.takes_real_parameter());
        assert!(!GeneratorKind::BarabasiAlbert.takes_real_parameter());
    }

    #[test]
    fn test_catalog_sizes() {
        let catalog = catalog();
        assert_eq!(catalog.generators.len(), 4);
        assert_eq!(catalog.dynamics.len(), 5);
        assert_eq!(catalog.reconstruction.len(), 16);
        assert_eq!(catalog.distance.len(), 17);
    }
}
