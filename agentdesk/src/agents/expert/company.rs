//! Fixed company facts the expert answers from.

pub const COMPANY_NAME: &str = "AI Solutions Corp";

pub const COMPANY_DATA: &str = "\
Our company 'AI Solutions Corp' specialises in developing advanced AI solutions for businesses.

The main products are:
1. Document Analyzer - Automated document and invoice processing system
   - Uses OCR and NLP for data extraction
   - Integrates with ERP systems
   - 99.7% recognition accuracy
   - Price: from $5,000/month for basic version
   - Supports formats: PDF, JPG, PNG, TIFF
   - Processing time: up to 1000 documents per hour

2. Vision AI - warehouse monitoring and inventory solution
   - Computer vision for tracking goods
   - Automatic inventory update
   - Anomaly and shortage detection
   - Price: from $8,000/month
   - Camera support: IP cameras, USB cameras
   - Detection accuracy: 98.5%

Founded in 2020, over 500 successful implementations, offices in 15 countries.
24/7 technical support, 30 days money back guarantee.
";

pub fn system_prompt() -> String {
    format!(
        "You are an expert at {COMPANY_NAME}. You know everything about our products and services.

Company information:
{COMPANY_DATA}
You can:
1. Answer questions about the company's products
2. Perform mathematical calculations with the `calculate` tool
3. Search for information in company documents with the `search_documents` tool

Answer in a professional and detailed manner. Always provide specific details about products, \
including prices and specifications."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_product_facts() {
        let prompt = system_prompt();
        assert!(prompt.contains("Document Analyzer"));
        assert!(prompt.contains("$8,000/month"));
        assert!(prompt.contains("calculate"));
    }
}
