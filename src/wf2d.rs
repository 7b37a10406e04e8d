//! The 2D Wright-Fisher competition lattice behind the simulator seam.
//!
//! Every generation each cell is replaced by the offspring of one cell drawn
//! from its Moore neighbourhood (the 3x3 block including the cell itself),
//! weighted by fitness. Time points are mapped to generations through the
//! division rate.
use crate::seed::SeedConfig;
use crate::simulator::{LabelledSim, SpawnSim};
use crate::CloneSize;
use anyhow::ensure;
use rand::Rng;

const ALLELE_ONE: u8 = 0b01;
const ALLELE_TWO: u8 = 0b10;
const DOUBLE_MUTANT: u8 = 0b11;

fn moore_neighbourhood(
    idx: usize,
    rows: usize,
    cols: usize,
) -> [usize; 9] {
    //! Linear indices of the 3x3 neighbourhood of `idx`, the cell itself
    //! included, wrapping around the lattice edges.
    let (row, col) = (idx / cols, idx % cols);
    let mut neighbours = [0usize; 9];
    let mut k = 0usize;
    for dr in [rows - 1, 0, 1] {
        for dc in [cols - 1, 0, 1] {
            let r = (row + dr) % rows;
            let c = (col + dc) % cols;
            neighbours[k] = r * cols + c;
            k += 1;
        }
    }
    neighbours
}

fn fitness_weighted_choice(
    neighbours: &[usize; 9],
    weight_of: impl Fn(usize) -> f32,
    rng: &mut impl Rng,
) -> usize {
    let total: f32 = neighbours.iter().map(|&j| weight_of(j)).sum();
    let mut draw = rng.gen::<f32>() * total;
    for &j in neighbours.iter() {
        let weight = weight_of(j);
        if draw < weight {
            return j;
        }
        draw -= weight;
    }
    // floating-point leftovers land on the last neighbour
    neighbours[8]
}

/// One realisation of the labelled-clone competition model, recording the
/// per-label cell counts at each requested time point.
#[derive(Clone, Debug)]
pub struct Wf2dSim {
    rows: usize,
    cols: usize,
    labels: Vec<u32>,
    fitness_by_label: Vec<f32>,
    clone_tag_by_label: Vec<u8>,
    division_rate: f32,
    timepoints: Vec<f32>,
    /// Cell counts per label, one entry per requested time point, filled by
    /// [`LabelledSim::run`].
    counts: Vec<Vec<CloneSize>>,
}

impl Wf2dSim {
    fn step(&mut self, rng: &mut impl Rng) {
        let mut next = self.labels.clone();
        for idx in 0..self.labels.len() {
            let neighbours = moore_neighbourhood(idx, self.rows, self.cols);
            let parent = fitness_weighted_choice(
                &neighbours,
                |j| self.fitness_by_label[self.labels[j] as usize],
                rng,
            );
            next[idx] = self.labels[parent];
        }
        self.labels = next;
    }

    fn label_counts(&self) -> Vec<CloneSize> {
        let mut counts = vec![0 as CloneSize; self.fitness_by_label.len()];
        for &label in self.labels.iter() {
            counts[label as usize] += 1;
        }
        counts
    }
}

impl LabelledSim for Wf2dSim {
    fn run(&mut self, rng: &mut impl Rng) -> anyhow::Result<()> {
        ensure!(
            self.counts.is_empty(),
            "the realisation has already been run"
        );
        let mut generation = 0u32;
        for i in 0..self.timepoints.len() {
            let target = (self.timepoints[i] * self.division_rate).round()
                as u32;
            while generation < target {
                self.step(rng);
                generation += 1;
            }
            self.counts.push(self.label_counts());
        }
        Ok(())
    }

    fn clone_sizes(
        &self,
        time: f32,
        tag: u8,
        exclude_extinct: bool,
    ) -> Vec<CloneSize> {
        let at = self
            .timepoints
            .iter()
            .position(|&t| (t - time).abs() < f32::EPSILON)
            .expect("queried a time point that was not requested");
        self.counts[at]
            .iter()
            .zip(self.clone_tag_by_label.iter())
            .filter(|(&count, &clone_tag)| {
                clone_tag == tag && !(exclude_extinct && count == 0)
            })
            .map(|(&count, _)| count)
            .collect()
    }
}

/// Constructs a fresh [`Wf2dSim`] per realisation from the same seed
/// configuration.
#[derive(Copy, Clone, Debug)]
pub struct Wf2dSpawner {
    /// Divisions per cell per day.
    pub division_rate: f32,
}

impl SpawnSim for Wf2dSpawner {
    type Sim = Wf2dSim;

    fn spawn(
        &self,
        seed: &SeedConfig,
        timepoints: &[f32],
    ) -> anyhow::Result<Wf2dSim> {
        ensure!(!timepoints.is_empty(), "no time points requested");
        ensure!(
            timepoints.windows(2).all(|w| w[0] < w[1]),
            "time points must be ascending and unique"
        );
        ensure!(
            self.division_rate > 0f32,
            "division rate must be positive"
        );
        let (rows, cols) = seed.shape();
        Ok(Wf2dSim {
            rows,
            cols,
            labels: seed.grid().to_vec(),
            fitness_by_label: seed.fitness_by_label.clone(),
            clone_tag_by_label: seed.clone_tag_by_label.clone(),
            division_rate: self.division_rate,
            timepoints: timepoints.to_vec(),
            counts: Vec::with_capacity(timepoints.len()),
        })
    }
}

/// The two competing NOTCH1 models: under haplosufficiency a single mutated
/// allele leaves the fitness unchanged, under haploinsufficiency it already
/// confers the heterozygous advantage.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GeneticModel {
    Haplosufficient,
    Haploinsufficient,
}

/// One realisation of double-mutant takeover: cells acquire NOTCH1 allele
/// mutations at division and the double-mutant population is recorded at
/// `samples + 1` evenly spaced sample times.
#[derive(Clone, Debug)]
pub struct MutationSim {
    side: usize,
    genotypes: Vec<u8>,
    /// Fitness indexed by the two-allele genotype bitmask.
    fitness_by_genotype: [f32; 4],
    mutation_rate: f64,
    division_rate: f32,
    max_time: f32,
    samples: usize,
    trajectory: Vec<CloneSize>,
}

impl MutationSim {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        side: usize,
        model: GeneticModel,
        het_fitness: f32,
        hom_fitness: f32,
        mutation_rate: f64,
        division_rate: f32,
        max_time: f32,
        samples: usize,
    ) -> Self {
        let single_allele = match model {
            GeneticModel::Haplosufficient => 1f32,
            GeneticModel::Haploinsufficient => het_fitness,
        };
        MutationSim {
            side,
            genotypes: vec![0u8; side * side],
            fitness_by_genotype: [
                1f32,
                single_allele,
                single_allele,
                hom_fitness,
            ],
            mutation_rate,
            division_rate,
            max_time,
            samples,
            trajectory: Vec::with_capacity(samples + 1),
        }
    }

    pub fn total_pop(&self) -> CloneSize {
        (self.side * self.side) as CloneSize
    }

    pub fn sample_times(&self) -> Vec<f32> {
        //! The `samples + 1` evenly spaced times over `[0, max_time]` at
        //! which the double-mutant population is recorded.
        (0..=self.samples)
            .map(|i| i as f32 * self.max_time / self.samples as f32)
            .collect()
    }

    pub fn run(&mut self, rng: &mut impl Rng) -> &[CloneSize] {
        //! Run one realisation, recording the double-mutant population at
        //! each sample time. The loop exits early once the double mutants
        //! have taken over the whole lattice: the outcome is decided and the
        //! aggregator right-pads the trajectory.
        let total = self.total_pop();
        let mut generation = 0u32;
        self.trajectory.clear();
        for time in self.sample_times() {
            let target = (time * self.division_rate).round() as u32;
            while generation < target {
                self.step(rng);
                generation += 1;
            }
            let double_mutants = self.double_mutants();
            self.trajectory.push(double_mutants);
            if double_mutants == total {
                break;
            }
        }
        &self.trajectory
    }

    pub fn trajectory(&self) -> &[CloneSize] {
        &self.trajectory
    }

    fn double_mutants(&self) -> CloneSize {
        self.genotypes
            .iter()
            .filter(|&&genotype| genotype == DOUBLE_MUTANT)
            .count() as CloneSize
    }

    fn step(&mut self, rng: &mut impl Rng) {
        let mut next = self.genotypes.clone();
        for idx in 0..self.genotypes.len() {
            let neighbours = moore_neighbourhood(idx, self.side, self.side);
            let parent = fitness_weighted_choice(
                &neighbours,
                |j| self.fitness_by_genotype[self.genotypes[j] as usize],
                rng,
            );
            let mut genotype = self.genotypes[parent];
            // each wild-type allele can mutate at division, independently
            for allele in [ALLELE_ONE, ALLELE_TWO] {
                if genotype & allele == 0 && rng.gen_bool(self.mutation_rate)
                {
                    genotype |= allele;
                }
            }
            next[idx] = genotype;
        }
        self.genotypes = next;
    }
}
