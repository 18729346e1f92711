//! Deterministic random instance generators.

use std::collections::BTreeMap;

use hr_core::errors::{ErrorInfo, HrError};
use hr_core::rng::RngHandle;
use hr_core::{Quota, VertexId};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bipartite::BipartiteGraph;

/// YAML-configurable parameters of a generated instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Preference model.
    #[serde(default)]
    pub model: GeneratorModel,
    /// Number of proposers (`r1..rn`).
    #[serde(default = "default_proposers")]
    pub proposers: usize,
    /// Number of receivers (`h1..hm`) before unused ones are dropped.
    #[serde(default = "default_receivers")]
    pub receivers: usize,
    /// Length of every proposer's preference list, capped at `receivers`.
    #[serde(default = "default_list_length")]
    pub list_length: usize,
    /// Upper quota of every receiver.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Share of kept receivers that receive a positive lower quota.
    #[serde(default)]
    pub lower_quota_fraction: f64,
    /// Lower quota assigned to the selected receivers, capped at `capacity`.
    #[serde(default = "default_lower_quota")]
    pub lower_quota: usize,
    /// Master seed of the run.
    #[serde(default)]
    pub seed: u64,
}

fn default_proposers() -> usize {
    100
}

fn default_receivers() -> usize {
    10
}

fn default_list_length() -> usize {
    5
}

fn default_capacity() -> usize {
    10
}

fn default_lower_quota() -> usize {
    1
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: GeneratorModel::default(),
            proposers: default_proposers(),
            receivers: default_receivers(),
            list_length: default_list_length(),
            capacity: default_capacity(),
            lower_quota_fraction: 0.0,
            lower_quota: default_lower_quota(),
            seed: 0,
        }
    }
}

impl GeneratorConfig {
    fn validate(&self) -> Result<(), HrError> {
        if self.proposers == 0 || self.receivers == 0 {
            return Err(config_error("empty-partition", "both partitions must be non-empty")
                .with_context("proposers", self.proposers)
                .with_context("receivers", self.receivers));
        }
        if self.list_length == 0 {
            return Err(config_error(
                "empty-lists",
                "list_length must be at least one",
            ));
        }
        if !(0.0..=1.0).contains(&self.lower_quota_fraction) {
            return Err(config_error(
                "invalid-fraction",
                "lower_quota_fraction must lie in [0, 1]",
            )
            .with_context("value", self.lower_quota_fraction));
        }
        if let GeneratorModel::MasterList { geometric_p } = self.model {
            if !(geometric_p > 0.0 && geometric_p <= 1.0) {
                return Err(config_error(
                    "invalid-probability",
                    "geometric_p must lie in (0, 1]",
                )
                .with_context("value", geometric_p));
            }
        }
        Ok(())
    }
}

/// Preference model used by [`generate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GeneratorModel {
    /// Uniformly random lists on both sides.
    Uniform,
    /// Popularity-weighted proposer lists over a proposer master order.
    MasterList {
        /// Success probability of the geometric receiver weights.
        #[serde(default = "default_geometric_p")]
        geometric_p: f64,
    },
}

fn default_geometric_p() -> f64 {
    0.1
}

impl Default for GeneratorModel {
    fn default() -> Self {
        GeneratorModel::Uniform
    }
}

/// Generates the instance described by `config` from its seed.
pub fn generate(config: &GeneratorConfig) -> Result<BipartiteGraph, HrError> {
    let mut rng = RngHandle::from_seed(config.seed);
    let graph = match config.model {
        GeneratorModel::Uniform => gen_uniform(config, &mut rng)?,
        GeneratorModel::MasterList { .. } => gen_master_list(config, &mut rng)?,
    };
    tracing::info!(
        seed = config.seed,
        proposers = graph.proposers().len(),
        receivers = graph.receivers().len(),
        edges = graph.edge_count(),
        "generated instance"
    );
    Ok(graph)
}

/// Generates `count` instances, instance `i` drawn from substream `i + 1` of the seed.
pub fn generate_batch(
    config: &GeneratorConfig,
    count: usize,
) -> Result<Vec<BipartiteGraph>, HrError> {
    (0..count)
        .map(|idx| {
            let mut rng = RngHandle::for_substream(config.seed, idx as u64 + 1);
            match config.model {
                GeneratorModel::Uniform => gen_uniform(config, &mut rng),
                GeneratorModel::MasterList { .. } => gen_master_list(config, &mut rng),
            }
        })
        .collect()
}

/// Uniform model: random proposer lists, receivers shuffle their applicants.
pub fn gen_uniform(
    config: &GeneratorConfig,
    rng: &mut RngHandle,
) -> Result<BipartiteGraph, HrError> {
    config.validate()?;
    let receivers: Vec<usize> = (0..config.receivers).collect();
    let length = config.list_length.min(config.receivers);
    let mut proposer_lists = Vec::with_capacity(config.proposers);
    let mut applicants: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for a in 0..config.proposers {
        let list: Vec<usize> = receivers.choose_multiple(rng, length).copied().collect();
        for &b in &list {
            applicants.entry(b).or_default().push(a);
        }
        proposer_lists.push(list);
    }
    for list in applicants.values_mut() {
        list.shuffle(rng);
    }
    assemble(config, proposer_lists, applicants, rng)
}

/// Master-list model with geometric receiver popularity.
pub fn gen_master_list(
    config: &GeneratorConfig,
    rng: &mut RngHandle,
) -> Result<BipartiteGraph, HrError> {
    config.validate()?;
    let geometric_p = match config.model {
        GeneratorModel::MasterList { geometric_p } => geometric_p,
        GeneratorModel::Uniform => default_geometric_p(),
    };

    let mut master: Vec<usize> = (0..config.proposers).collect();
    master.shuffle(rng);
    let mut master_rank = vec![0usize; config.proposers];
    for (position, &a) in master.iter().enumerate() {
        master_rank[a] = position;
    }

    let raw: Vec<f64> = (0..config.receivers)
        .map(|_| sample_geometric(geometric_p, rng))
        .collect();
    let total: f64 = raw.iter().sum();
    let weights: Vec<f64> = raw.iter().map(|w| w / total).collect();

    let receivers: Vec<usize> = (0..config.receivers).collect();
    let length = config.list_length.min(config.receivers);
    let mut proposer_lists = Vec::with_capacity(config.proposers);
    let mut applicants: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for a in 0..config.proposers {
        let mut list: Vec<usize> = receivers
            .choose_multiple_weighted(rng, length, |&b| weights[b])
            .map_err(|err| {
                config_error("weighted-sampling", err.to_string()).with_context("proposer", a)
            })?
            .copied()
            .collect();
        list.sort_by(|x, y| weights[*y].total_cmp(&weights[*x]).then(x.cmp(y)));
        for &b in &list {
            applicants.entry(b).or_default().push(a);
        }
        proposer_lists.push(list);
    }
    for list in applicants.values_mut() {
        list.sort_by_key(|&a| master_rank[a]);
    }
    assemble(config, proposer_lists, applicants, rng)
}

// Number of trials up to and including the first success.
fn sample_geometric(p: f64, rng: &mut RngHandle) -> f64 {
    if p >= 1.0 {
        return 1.0;
    }
    let u: f64 = 1.0 - rng.gen::<f64>();
    (u.ln() / (1.0 - p).ln()).ceil().max(1.0)
}

fn assemble(
    config: &GeneratorConfig,
    proposer_lists: Vec<Vec<usize>>,
    applicants: BTreeMap<usize, Vec<usize>>,
    rng: &mut RngHandle,
) -> Result<BipartiteGraph, HrError> {
    let proposer_id = |a: usize| VertexId::new(format!("r{}", a + 1));
    let receiver_id = |b: usize| VertexId::new(format!("h{}", b + 1));

    let kept: Vec<usize> = applicants.keys().copied().collect();
    let constrained_count = (config.lower_quota_fraction * kept.len() as f64).round() as usize;
    let mut constrained: Vec<usize> = kept
        .choose_multiple(rng, constrained_count.min(kept.len()))
        .copied()
        .collect();
    constrained.sort_unstable();
    let lower = config.lower_quota.min(config.capacity);

    let mut preferences = BTreeMap::new();
    let proposers = proposer_lists
        .into_iter()
        .enumerate()
        .map(|(a, list)| {
            preferences.insert(proposer_id(a), list.into_iter().map(receiver_id).collect());
            (proposer_id(a), Quota::unit())
        })
        .collect::<Vec<_>>();
    let mut receivers = Vec::with_capacity(kept.len());
    for (b, list) in applicants {
        let quota = if constrained.binary_search(&b).is_ok() {
            Quota::new(lower, config.capacity)?
        } else {
            Quota::upper_only(config.capacity)
        };
        preferences.insert(receiver_id(b), list.into_iter().map(proposer_id).collect());
        receivers.push((receiver_id(b), quota));
    }
    BipartiteGraph::new(proposers, receivers, preferences)
}

fn config_error(code: &str, message: impl Into<String>) -> HrError {
    HrError::Config(ErrorInfo::new(code, message))
}
