pub mod elasticity_pipeline;

pub use elasticity_pipeline::ElasticityPipeline;
