pub mod enrichment_results;
pub mod gene_set;
pub mod tissue_dictionary;
