//! Reference implementations. Every parameter combination is supported.

use crate::accel::Engine;

layer!(
    /// Direct convolution, any dilation.
    ConvolutionLayer,
    Engine::Native
);
layer!(
    /// Transposed convolution. Also serves accelerated requests.
    DeconvolutionLayer,
    Engine::Native
);
layer!(
    /// Max, average and stochastic pooling with index tracking.
    PoolingLayer,
    Engine::Native
);
layer!(LrnLayer, Engine::Native);
layer!(ReluLayer, Engine::Native);
layer!(SigmoidLayer, Engine::Native);
layer!(TanhLayer, Engine::Native);
layer!(SoftmaxLayer, Engine::Native);

// Kinds with a single implementation.
layer!(ImageLabelDataLayer, Engine::Native);
layer!(MeshImageLabelDataLayer, Engine::Native);
layer!(ImageDepthLabelDataLayer, Engine::Native);
layer!(Image2MeshLayer, Engine::Native);
layer!(DropoutLayer, Engine::Native);
layer!(SoftmaxWithLossLayer, Engine::Native);
layer!(
    /// Softmax loss refined by a conditional random field.
    CrfLossLayer,
    Engine::Native
);
layer!(AccuracyLayer, Engine::Native);
layer!(
    /// Graph input placeholder.
    InputLayer,
    Engine::Native
);
