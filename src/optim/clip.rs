//! Global gradient-norm clipping

use crate::Tensor;

/// L2 norm over every gradient present on `params`
///
/// Parameters without a gradient contribute nothing.
pub fn grad_norm(params: &[&mut Tensor]) -> f32 {
    params
        .iter()
        .filter_map(|p| p.grad())
        .map(|g| g.iter().map(|&v| v * v).sum::<f32>())
        .sum::<f32>()
        .sqrt()
}

/// Rescale all gradients so their joint norm is at most `max_norm`
///
/// Returns the norm measured before rescaling. Gradients already within the
/// bound are left untouched.
pub fn clip_grad_norm(params: &mut [&mut Tensor], max_norm: f32) -> f32 {
    let norm = grad_norm(params);
    if norm > max_norm {
        let factor = max_norm / norm;
        for grad_owner in params.iter() {
            if let Some(grad) = grad_owner.grad() {
                grad_owner.set_grad(grad * factor);
            }
        }
    }
    norm
}
