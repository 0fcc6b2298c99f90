//! Tensor with shared gradient storage

use super::backward::BackwardOp;
use super::context::is_grad_enabled;
use ndarray::Array1;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared, lazily allocated gradient buffer
pub type GradCell = Rc<RefCell<Option<Array1<f32>>>>;

/// Row-major 2-D tensor participating in the autograd graph
///
/// Data is stored flat in an [`Array1`]; `(rows, cols)` gives the logical
/// shape. Cloning is cheap: data is reference counted and the gradient cell is
/// shared, so gradients accumulated through any clone are visible on the
/// original (this is how model parameters receive gradients from the graph
/// built during a forward pass).
#[derive(Clone)]
pub struct Tensor {
    data: Rc<Array1<f32>>,
    rows: usize,
    cols: usize,
    grad: GradCell,
    backward_op: Option<Rc<dyn BackwardOp>>,
    requires_grad: bool,
}

impl Tensor {
    /// Create a row vector `(1, n)`
    pub fn new(data: Array1<f32>, requires_grad: bool) -> Self {
        let cols = data.len();
        Self::with_shape(data, 1, cols, requires_grad)
    }

    /// Create a `(rows, cols)` tensor from flat row-major data
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != rows * cols`.
    pub fn with_shape(data: Array1<f32>, rows: usize, cols: usize, requires_grad: bool) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "Tensor data length {} does not match shape ({rows}, {cols})",
            data.len()
        );
        Self {
            data: Rc::new(data),
            rows,
            cols,
            grad: Rc::new(RefCell::new(None)),
            backward_op: None,
            requires_grad,
        }
    }

    /// Create a row vector from a `Vec`
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        Self::new(Array1::from(data), requires_grad)
    }

    /// Create a `(rows, cols)` matrix from a `Vec`
    pub fn from_matrix(data: Vec<f32>, rows: usize, cols: usize, requires_grad: bool) -> Self {
        Self::with_shape(Array1::from(data), rows, cols, requires_grad)
    }

    /// Zero-filled row vector
    pub fn zeros(len: usize, requires_grad: bool) -> Self {
        Self::new(Array1::zeros(len), requires_grad)
    }

    /// Zero-filled `(rows, cols)` matrix
    pub fn zeros_matrix(rows: usize, cols: usize, requires_grad: bool) -> Self {
        Self::with_shape(Array1::zeros(rows * cols), rows, cols, requires_grad)
    }

    /// Single-element tensor
    pub fn scalar(value: f32, requires_grad: bool) -> Self {
        Self::from_vec(vec![value], requires_grad)
    }

    /// Internal constructor for op results: only tracks gradients when a
    /// no-grad guard is not active.
    pub(crate) fn op_result(data: Array1<f32>, rows: usize, cols: usize, requires_grad: bool) -> Self {
        Self::with_shape(data, rows, cols, requires_grad && is_grad_enabled())
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the tensor holds no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat data
    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    /// Mutable flat data (copy-on-write if the buffer is shared by a live graph)
    pub fn data_mut(&mut self) -> &mut Array1<f32> {
        Rc::make_mut(&mut self.data)
    }

    /// Element at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    /// First element, for scalar results such as losses
    pub fn item(&self) -> f32 {
        self.data[0]
    }

    /// Same storage and graph node viewed with a different shape
    ///
    /// # Panics
    ///
    /// Panics if the element count changes.
    pub fn reshape(&self, rows: usize, cols: usize) -> Self {
        assert_eq!(rows * cols, self.len(), "reshape must preserve element count");
        let mut view = self.clone();
        view.rows = rows;
        view.cols = cols;
        view
    }

    /// Copy of this tensor cut from the graph
    pub fn detach(&self) -> Self {
        Self::with_shape((*self.data).clone(), self.rows, self.cols, false)
    }

    /// Whether gradients flow into this tensor
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Accumulated gradient, if any
    pub fn grad(&self) -> Option<Array1<f32>> {
        self.grad.borrow().clone()
    }

    /// Overwrite the gradient
    pub fn set_grad(&self, grad: Array1<f32>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Add into the gradient, allocating it on first use
    pub fn accumulate_grad(&self, grad: Array1<f32>) {
        let mut cell = self.grad.borrow_mut();
        match cell.as_mut() {
            Some(existing) => *existing += &grad,
            None => *cell = Some(grad),
        }
    }

    /// Drop the gradient
    pub fn zero_grad(&self) {
        *self.grad.borrow_mut() = None;
    }

    /// Shared gradient cell (used by backward ops)
    pub fn grad_cell(&self) -> GradCell {
        Rc::clone(&self.grad)
    }

    /// Operation that produced this tensor
    pub fn backward_op(&self) -> Option<Rc<dyn BackwardOp>> {
        self.backward_op.clone()
    }

    /// Attach the operation that produced this tensor
    pub fn set_backward_op(&mut self, op: Rc<dyn BackwardOp>) {
        self.backward_op = Some(op);
    }

    /// Graph node identity, shared by clones and reshaped views
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.grad) as *const () as usize
    }

    /// True when every element is finite
    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &(self.rows, self.cols))
            .field("requires_grad", &self.requires_grad)
            .field("has_grad", &self.grad.borrow().is_some())
            .finish()
    }
}
