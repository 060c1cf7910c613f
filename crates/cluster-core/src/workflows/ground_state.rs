use super::result::SimulationResult;
use crate::core::hierarchy::{ClusterHierarchy, HierarchyProvider, PotentialHierarchy};
use crate::core::models::charge::{ChargeMultiset, ChargeState};
use crate::core::models::cluster::Cluster;
use crate::core::models::configuration::{ChargeConfiguration, ChargeDistribution};
use crate::core::models::layout::SiteLayout;
use crate::core::physics::surface::ChargeSurface;
use crate::engine::bounds::PotentialBounds;
use crate::engine::cache::{AssignmentCache, BoundCache};
use crate::engine::config::SearchConfig;
use crate::engine::context::SearchContext;
use crate::engine::error::EngineError;
use crate::engine::partition::{MultisetPartition, two_state_multisets};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::refine::Refiner;
use crate::engine::stability::StabilityChecker;
use itertools::Itertools;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

pub const ALGORITHM_NAME: &str = "ClusterExact";

/// Finds every physically valid charge distribution of `layout`.
///
/// Sites that are negative in every valid configuration are pre-assigned. The remaining
/// sites are searched with negative and neutral charges; when positive charges are
/// allowed and some sites could hold one, every subset of those candidates is then fixed
/// positive in turn and searched again. Every configuration the search yields is
/// confirmed with the exact validity check before it is returned.
///
/// # Errors
///
/// Returns [`EngineError::InvalidLayout`] for layouts with duplicate sites or invalid
/// dimer indices and [`EngineError::ThreadPool`] if the worker pool cannot be created.
#[instrument(skip_all, name = "ground_state_workflow")]
pub fn run(
    layout: &SiteLayout,
    config: &SearchConfig,
    reporter: &ProgressReporter,
) -> Result<SimulationResult, EngineError> {
    let start = Instant::now();
    layout.validate()?;
    let params = config.physical_params;
    let n = layout.num_sites();

    if layout.is_empty() {
        info!("Layout is empty. Returning an empty result.");
        return Ok(SimulationResult::new(
            ALGORITHM_NAME,
            start.elapsed(),
            params,
            Vec::new(),
        ));
    }

    let surface = ChargeSurface::new(layout, params);
    let negative_sites = surface.must_be_negative_sites();
    let mut fixity: Vec<Option<ChargeState>> = vec![None; n];
    for &site in &negative_sites {
        fixity[site] = Some(ChargeState::Negative);
    }
    info!(
        sites = n,
        forced_negative = negative_sites.len(),
        "Starting ClusterExact search."
    );

    if negative_sites.len() == n {
        info!("Every site is forced negative; verifying the single candidate.");
        let forced = ChargeConfiguration::uniform(n, ChargeState::Negative);
        let distributions = verify(&surface, [forced].into_iter().collect());
        return Ok(SimulationResult::new(
            ALGORITHM_NAME,
            start.elapsed(),
            params,
            distributions,
        ));
    }

    let threads = config.effective_threads();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| EngineError::ThreadPool(e.to_string()))?;

    let hierarchy = reporter.phase("Building Hierarchy", || {
        PotentialHierarchy::new(layout, params, config.cone_angle).build()
    });
    let assignments = AssignmentCache::new();
    let context = SearchContext::new(&surface, &hierarchy, &assignments, config, reporter);

    let mut found: HashSet<ChargeConfiguration> = HashSet::new();
    found.extend(reporter.phase("Two-State Search", || {
        pool.install(|| run_pass(&context, &fixity, threads))
    }));

    if config.allow_positive_charges {
        let candidates = surface.positive_candidates();
        if !candidates.is_empty() {
            found.extend(reporter.phase("Three-State Search", || {
                pool.install(|| run_positive_passes(&context, &fixity, &candidates, threads))
            }));
        }
    }

    debug!(
        candidates = found.len(),
        assignment_sets = assignments.len(),
        "Search finished; verifying candidates."
    );
    let distributions = reporter.phase("Verification", || verify(&surface, found));

    let result = SimulationResult::new(ALGORITHM_NAME, start.elapsed(), params, distributions);
    info!(
        valid = result.len(),
        runtime_ms = result.runtime.as_millis() as u64,
        "ClusterExact search complete."
    );
    Ok(result)
}

/// Runs the search with the default physical parameters.
///
/// # Arguments
///
/// * `layout` - The sites to simulate.
/// * `cone_angle` - Opening angle of the hierarchy's observation cones, in degrees.
/// * `thread_count` - Worker threads to search with.
pub fn find_ground_state(
    layout: &SiteLayout,
    cone_angle: f64,
    thread_count: usize,
) -> Result<SimulationResult, EngineError> {
    let config = SearchConfig::builder()
        .cone_angle(cone_angle)
        .num_threads(thread_count)
        .build()?;
    run(layout, &config, &ProgressReporter::new())
}

/// Repeats the search once per subset of `candidates` fixed positive.
fn run_positive_passes(
    context: &SearchContext,
    fixity: &[Option<ChargeState>],
    candidates: &[usize],
    threads: usize,
) -> HashSet<ChargeConfiguration> {
    let max = context.config.max_positive_candidates;
    let subsets: Vec<Vec<usize>> = if candidates.len() > max {
        warn!(
            candidates = candidates.len(),
            max, "Too many positive candidates; only fixing all of them positive."
        );
        vec![candidates.to_vec()]
    } else {
        candidates
            .iter()
            .copied()
            .powerset()
            .filter(|s| !s.is_empty())
            .collect()
    };
    info!(
        candidates = candidates.len(),
        passes = subsets.len(),
        "Searching with positive charges."
    );

    let mut found = HashSet::new();
    for subset in subsets {
        let pass_fixity = context.fixity_with(fixity, &subset, ChargeState::Positive);
        found.extend(run_pass(context, &pass_fixity, threads));
    }
    found
}

/// One search pass over the hierarchy under a fixed pre-assignment.
#[instrument(skip_all, name = "search_pass")]
fn run_pass(
    context: &SearchContext,
    fixity: &[Option<ChargeState>],
    threads: usize,
) -> HashSet<ChargeConfiguration> {
    let hierarchy = context.hierarchy.with_fixed_charges(fixity);
    let free_sites = fixity.iter().filter(|f| f.is_none()).count();

    let bound_cache = BoundCache::new();
    let bounds = PotentialBounds::new(
        context.surface,
        context.assignments,
        &bound_cache,
        context.config.bound_cache_min_size,
    );
    let checker = StabilityChecker::new(bounds, context.surface.params());
    let refiner = Refiner::new(&hierarchy, &checker, context.num_sites());

    let tops = two_state_multisets(free_sites);
    debug!(
        free_sites,
        top_level_multisets = tops.len(),
        "Starting search pass."
    );
    context.reporter.report(Progress::TaskStart {
        total_steps: tops.len() as u64,
    });

    let found = Mutex::new(HashSet::new());
    let chunk_size = tops.len().div_ceil(threads.max(1)).max(1);
    tops.par_chunks(chunk_size).for_each(|range| {
        for &multiset in range {
            let configurations = search_top_level(&hierarchy, &refiner, multiset);
            found.lock().extend(configurations);
            context.reporter.report(Progress::TaskIncrement);
        }
    });

    context.reporter.report(Progress::TaskFinish);
    let found = found.into_inner();
    debug!(
        candidates = found.len(),
        cached_bounds = bound_cache.len(),
        "Search pass finished."
    );
    found
}

/// Explores every distribution of a top-level multiset across the root's children.
fn search_top_level(
    hierarchy: &ClusterHierarchy,
    refiner: &Refiner,
    multiset: ChargeMultiset,
) -> Vec<ChargeConfiguration> {
    let root = hierarchy.root();
    let mut out = Vec::new();
    let children = hierarchy.children(root);
    if children.is_empty() {
        refiner.refine(&[root], &[multiset], &mut out);
        return out;
    }

    let clusters: Vec<&Cluster> = children.iter().map(|&c| hierarchy.cluster(c)).collect();
    for sigma in MultisetPartition::for_clusters(&clusters, multiset).distributions() {
        refiner.refine(children, &sigma, &mut out);
    }
    out
}

/// Keeps the configurations that pass the exact validity check, with their energies.
pub(crate) fn verify(
    surface: &ChargeSurface,
    configurations: HashSet<ChargeConfiguration>,
) -> Vec<ChargeDistribution> {
    let mut scratch = surface.clone();
    configurations
        .into_iter()
        .filter_map(|configuration| {
            scratch.assign_configuration(&configuration);
            scratch.update_after_charge_change();
            scratch.is_physically_valid().then(|| ChargeDistribution {
                system_energy: scratch.system_energy(),
                configuration,
            })
        })
        .collect()
}
