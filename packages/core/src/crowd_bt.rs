//! Crowd Bradley-Terry posterior updates.
//!
//! Each judge carries a Beta(alpha, beta) belief about their own reliability and
//! each project a Gaussian (mu, sigma^2) belief about its quality. A single
//! "winner beat loser" observation updates all three. Selection no longer uses
//! these updates; they are kept for offline comparison against the matrix
//! policy.

/// Lower bound on the variance shrink factor.
pub const KAPPA: f64 = 0.0001;

/// Annotator reliability prior.
pub const ALPHA_PRIOR: f64 = 10.0;
pub const BETA_PRIOR: f64 = 1.0;

/// Project quality prior.
pub const MU_PRIOR: f64 = 0.0;
pub const SIGMA_SQ_PRIOR: f64 = 1.0;

/// Judge reliability belief.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annotator {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for Annotator {
    fn default() -> Self {
        Self {
            alpha: ALPHA_PRIOR,
            beta: BETA_PRIOR,
        }
    }
}

/// Project quality belief.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item {
    pub mu: f64,
    pub sigma_sq: f64,
}

impl Default for Item {
    fn default() -> Self {
        Self {
            mu: MU_PRIOR,
            sigma_sq: SIGMA_SQ_PRIOR,
        }
    }
}

/// Posterior after observing `winner` preferred over `loser` by `annotator`.
pub fn update(annotator: Annotator, winner: Item, loser: Item) -> (Annotator, Item, Item) {
    let (annotator_next, _) = updated_annotator(annotator, winner, loser);
    let (mu_winner, mu_loser) = updated_mus(annotator, winner, loser);
    let (sigma_sq_winner, sigma_sq_loser) = updated_sigma_sqs(annotator, winner, loser);
    (
        annotator_next,
        Item {
            mu: mu_winner,
            sigma_sq: sigma_sq_winner,
        },
        Item {
            mu: mu_loser,
            sigma_sq: sigma_sq_loser,
        },
    )
}

/// KL divergence between two Gaussians, `N1 || N2`.
pub fn divergence_gaussian(a: Item, b: Item) -> f64 {
    let ratio = a.sigma_sq / b.sigma_sq;
    (a.mu - b.mu).powi(2) / (2.0 * b.sigma_sq) + (ratio - 1.0 - ratio.ln()) / 2.0
}

fn updated_mus(ann: Annotator, w: Item, l: Item) -> (f64, f64) {
    let (ew, el) = (w.mu.exp(), l.mu.exp());
    let mult = (ann.alpha * ew) / (ann.alpha * ew + ann.beta * el) - ew / (ew + el);
    (w.mu + w.sigma_sq * mult, l.mu - l.sigma_sq * mult)
}

fn updated_sigma_sqs(ann: Annotator, w: Item, l: Item) -> (f64, f64) {
    let (ew, el) = (w.mu.exp(), l.mu.exp());
    let mult = (ann.alpha * ew * ann.beta * el) / (ann.alpha * ew + ann.beta * el).powi(2)
        - (ew * el) / (ew + el).powi(2);
    (
        w.sigma_sq * (1.0 + w.sigma_sq * mult).max(KAPPA),
        l.sigma_sq * (1.0 + l.sigma_sq * mult).max(KAPPA),
    )
}

/// Updated annotator belief and the probability that the annotator is reliable.
fn updated_annotator(ann: Annotator, w: Item, l: Item) -> (Annotator, f64) {
    let (alpha, beta) = (ann.alpha, ann.beta);
    let (ew, el) = (w.mu.exp(), l.mu.exp());

    let c1 = ew / (ew + el)
        + 0.5 * (w.sigma_sq + l.sigma_sq) * (ew * el * (el - ew)) / (ew + el).powi(3);
    let c2 = 1.0 - c1;
    let c = (c1 * alpha + c2 * beta) / (alpha + beta);

    let expt = (c1 * (alpha + 1.0) * alpha + c2 * alpha * beta)
        / (c * (alpha + beta + 1.0) * (alpha + beta));
    let expt_sq = (c1 * (alpha + 2.0) * (alpha + 1.0) * alpha
        + c2 * (alpha + 1.0) * alpha * beta)
        / (c * (alpha + beta + 2.0) * (alpha + beta + 1.0) * (alpha + beta));
    let variance = expt_sq - expt.powi(2);

    (
        Annotator {
            alpha: ((expt - expt_sq) * expt) / variance,
            beta: (expt - expt_sq) * (1.0 - expt) / variance,
        },
        c,
    )
}
