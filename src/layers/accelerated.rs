//! Accelerated-engine implementations.
//!
//! Only constructed by a rule after the capability probe and the operator's
//! own constraints have cleared them.

use crate::accel::Engine;

layer!(
    /// No dilation support.
    AcceleratedConvolutionLayer,
    Engine::Accelerated
);
layer!(
    /// Single output only. Average and stochastic pooling.
    AcceleratedPoolingLayer,
    Engine::Accelerated
);
layer!(
    /// Cross-channel LRN up to the probe's window limit.
    AcceleratedLrnLayer,
    Engine::Accelerated
);
layer!(
    /// Local contrast normalization, used for within-channel LRN.
    AcceleratedLcnLayer,
    Engine::Accelerated
);
layer!(AcceleratedReluLayer, Engine::Accelerated);
layer!(AcceleratedSigmoidLayer, Engine::Accelerated);
layer!(AcceleratedTanhLayer, Engine::Accelerated);
layer!(AcceleratedSoftmaxLayer, Engine::Accelerated);
