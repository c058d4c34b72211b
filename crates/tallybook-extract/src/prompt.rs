//! The fixed task description sent with every extraction request.

/// Instructions for the extraction model.
///
/// The reply shape matches [`tallybook_core::ExtractedData`]. Amounts are INR.
pub const EXTRACTION_PROMPT: &str = r#"
You extract invoice, product and customer data from business documents (PDFs, images,
spreadsheets). Read the provided content and answer with a single JSON object:

{
  "invoices": [
    {
      "serialNumber": "string (invoice number)",
      "customerName": "string",
      "productName": "string",
      "quantity": number,
      "tax": number (tax amount in INR),
      "totalAmount": number (in INR, tax included),
      "date": "string (YYYY-MM-DD)",
      "missingFields": ["names of fields that are absent or unclear"]
    }
  ],
  "products": [
    {
      "name": "string",
      "quantity": number,
      "unitPrice": number (in INR, after discount),
      "tax": number (in INR),
      "priceWithTax": number (in INR),
      "discount": number (optional, in INR),
      "missingFields": ["names of fields that are absent"]
    }
  ],
  "customers": [
    {
      "name": "string",
      "phoneNumber": "string",
      "totalPurchaseAmount": number (in INR),
      "email": "string (optional)",
      "address": "string (optional)",
      "missingFields": ["names of fields that are absent"]
    }
  ]
}

TAX RULES:
1. When both the amount before tax and the final amount are printed:
   - tax = final amount - amount before tax
   - unitPrice = amount before tax / quantity
   - never re-derive tax from a percentage
2. When a discount is printed:
   - apply the discount to the base price first
   - compute tax on the discounted price
   - unitPrice is the discounted price, not the original base price
   - example: base 79990, discount 7% (-5599.30), discounted 69183.35, final 79990
     gives tax = 79990 - 69183.35 = 10806.65 and unitPrice = 69183.35

LINE ITEMS:
- When one serial number lists several products, emit one invoice entry per product,
  each carrying the same serialNumber.
- Example: serial RAY/23-24/286 lists iPhone 16, iPhone 16 Cover and Beats PRO X, so
  emit three invoice entries with serialNumber "RAY/23-24/286".

GENERAL:
1. Extract every invoice, product and customer in the document.
2. If a field cannot be determined, list it in "missingFields" instead of guessing.
3. Sum a customer's purchases when they appear on several invoices.
4. All amounts are INR.
5. Return only the JSON object, without markdown formatting.
"#;
