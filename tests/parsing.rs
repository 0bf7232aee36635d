use saxmap::strategy::map_documents;
use saxmap::{
    to_xml, AttributeBag, DecimalConverter, FieldOptions, FnConverter, IntegerConverter, MapError, MappedObject,
    Mapping, MappingParser, NaiveCollector, NodeSpec, ParseOptions, RelationOptions, Value,
};
use std::fs;
use std::path::PathBuf;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{}.xml", name))
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).unwrap()
}

fn parse_fixture(mapping: &Mapping, roots: &[&str], name: &str) -> Vec<MappedObject> {
    init_logging();
    let mut parser = MappingParser::new(mapping, roots, NaiveCollector::new()).unwrap();
    parser.parse_str(&read_fixture(name)).unwrap();
    parser.into_collector().into_objects()
}

fn text(value: &str) -> Value {
    Value::from(value)
}

fn parse_doc(mapping: &Mapping, roots: &[&str], xml: &str) -> Vec<MappedObject> {
    init_logging();
    let mut parser = MappingParser::new(mapping, roots, NaiveCollector::new()).unwrap();
    parser.parse_str(xml).unwrap();
    parser.into_collector().into_objects()
}

// ============================================================================
// Single node documents
// ============================================================================

fn product_mapping() -> Mapping {
    Mapping::builder()
        .register(
            NodeSpec::builder("Product")
                .node("product")
                .map("id", "@id")
                .map("status", "@status")
                .group("name_stuff", |g| g.map("name_confirmed", "name/@confirmed").map("name", "name"))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

#[test]
fn test_single_node_fields() {
    let mapping = product_mapping();
    let objects = parse_fixture(&mapping, &["Product"], "simple_product");

    assert_eq!(objects.len(), 1);
    let product = &objects[0];
    assert_eq!(product.type_name(), "Product");
    assert_eq!(product.get("id"), Some(&text("123")));
    assert_eq!(product.get("status"), Some(&text("new")));
    assert_eq!(product.get("name_confirmed"), Some(&text("yes")));
    assert_eq!(product.get("name"), Some(&text("iPhone 5G")));
}

#[test]
fn test_single_node_to_xml() {
    let mapping = product_mapping();
    let mut product = mapping.new_object("Product", "product").unwrap();
    product.set("id", "123");
    product.set("status", "new");
    product.set("name_confirmed", "yes");
    product.set("name", "iPhone 5G");

    let expected = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", read_fixture("simple_product"));
    assert_eq!(to_xml(&product).unwrap(), expected);
}

#[test]
fn test_group_attributes() {
    let mapping = product_mapping();
    let objects = parse_fixture(&mapping, &["Product"], "simple_product");

    let expected: AttributeBag = [("name_confirmed", "yes"), ("name", "iPhone 5G")].into_iter().collect();
    assert_eq!(objects[0].group_attributes("name_stuff"), Some(expected));
    assert_eq!(objects[0].group_attributes("missing"), None);
}

// ============================================================================
// Property feeds: inheritance, hooks, nested relations
// ============================================================================

fn street_number(attributes: &mut AttributeBag, value: Value) {
    let raw = value.to_string();
    let prefix: String = raw
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '\\' | '/' | '-' | ' '))
        .collect();
    attributes.insert("office_street_number", prefix.trim());
}

fn read_street_number(attributes: &AttributeBag) -> Option<Value> {
    attributes.get("office_street_number").cloned()
}

fn feed_date() -> FnConverter {
    FnConverter::new(|raw| Ok(Value::Text(format!("somedate: {}", raw))))
        .with_format(|value| value.as_str().map(|s| s.trim_start_matches("somedate: ").to_string()))
}

fn property_mapping() -> Mapping {
    let collected_by_parent = RelationOptions::new().parent_collects(true);
    Mapping::builder()
        .register(NodeSpec::builder("Agent").node("listingAgent").map("name", "name").build().unwrap())
        .register(NodeSpec::builder("Image").node("img").map("id", "@id").build().unwrap())
        .register(
            NodeSpec::builder("PropertyBase")
                .map_with("modified_at", "@modTime", FieldOptions::new().converter(feed_date()))
                .build()
                .unwrap(),
        )
        .register(
            NodeSpec::builder("Business")
                .extends("PropertyBase")
                .node("business")
                .map_with("office_name", "officeDetails/officeName", FieldOptions::new().cdata())
                .map_with(
                    "office_street_address",
                    "officeDetails/addressStreet",
                    FieldOptions::new().cdata().assign(street_number).read(read_street_number),
                )
                .relate_one_with("agent", &["listingAgent"], "Agent", collected_by_parent.clone())
                .relate_many_with("images", &["images/img"], &["Image"], collected_by_parent)
                .build()
                .unwrap(),
        )
        .register(NodeSpec::builder("Residential").extends("PropertyBase").node("residential").build().unwrap())
        .register(
            NodeSpec::builder("PropertyList")
                .node("propertyList")
                .collect(false)
                .relate_many("properties", &[], &["Business", "Residential"])
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

#[test]
fn test_builds_each_node_type() {
    let mapping = property_mapping();
    let objects = parse_fixture(&mapping, &["PropertyList"], "reaxml");

    let types: Vec<&str> = objects.iter().map(|o| o.type_name()).collect();
    assert_eq!(types, ["Business", "Residential", "Residential", "Residential"]);

    let business = &objects[0];
    assert_eq!(business.get("modified_at"), Some(&text("somedate: 2010-08-02-13:25")));
    assert_eq!(business.get("office_name"), Some(&text("Sydney Premier Real Estate")));
    assert_eq!(business.get("office_street_address"), None);
    assert_eq!(business.get("office_street_number"), Some(&text("2/8")));

    let agent = business.relation("agent").and_then(|r| r.one()).unwrap();
    assert_eq!(agent.type_name(), "Agent");
    assert_eq!(agent.get("name"), Some(&text("Sonia Hume")));

    let ids: Vec<String> = business
        .relation("images")
        .unwrap()
        .objects()
        .iter()
        .map(|img| img.get("id").unwrap().to_string())
        .collect();
    assert_eq!(ids, ["m", "a", "b", "c"]);

    let residential = &objects[1];
    assert_eq!(residential.get("modified_at"), Some(&text("somedate: 2010-08-03-09:10")));
    assert!(residential.relation("agent").is_none());
}

#[test]
fn test_parent_collected_objects_stay_out_of_collector() {
    let mapping = property_mapping();
    let objects = parse_fixture(&mapping, &["PropertyList"], "reaxml");

    assert!(objects.iter().all(|o| o.type_name() != "Agent" && o.type_name() != "Image"));
    assert!(objects.iter().all(|o| o.type_name() != "PropertyList"));
}

#[test]
fn test_business_to_xml() {
    let mapping = property_mapping();
    let objects = parse_fixture(&mapping, &["PropertyList"], "reaxml");

    assert_eq!(
        to_xml(&objects[0]).unwrap(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <business modTime=\"2010-08-02-13:25\">\n\
         \x20 <officeDetails>\n\
         \x20   <officeName><![CDATA[Sydney Premier Real Estate]]></officeName>\n\
         \x20   <addressStreet><![CDATA[2/8]]></addressStreet>\n\
         \x20 </officeDetails>\n\
         \x20 <listingAgent>\n\
         \x20   <name>Sonia Hume</name>\n\
         \x20 </listingAgent>\n\
         \x20 <images>\n\
         \x20   <img id=\"m\"/>\n\
         \x20   <img id=\"a\"/>\n\
         \x20   <img id=\"b\"/>\n\
         \x20   <img id=\"c\"/>\n\
         \x20 </images>\n\
         </business>\n"
    );
}

#[test]
fn test_property_list_to_xml() {
    let mapping = property_mapping();
    let objects = parse_fixture(&mapping, &["PropertyList"], "reaxml");
    let residentials: Vec<MappedObject> = objects.into_iter().filter(|o| o.type_name() == "Residential").collect();

    let mut list = mapping.new_object("PropertyList", "propertyList").unwrap();
    list.set_relation_many("properties", residentials);

    assert_eq!(
        to_xml(&list).unwrap(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <propertyList>\n\
         \x20 <residential modTime=\"2010-08-03-09:10\"/>\n\
         \x20 <residential modTime=\"2010-08-04-11:45\"/>\n\
         \x20 <residential modTime=\"2010-08-06-16:20\"/>\n\
         </propertyList>\n"
    );
}

#[test]
fn test_ambiguous_singular_relation_is_fatal() {
    init_logging();
    let mapping = property_mapping();
    let xml = "<propertyList>\
               <business><listingAgent><name>A</name></listingAgent></business>\
               <business><listingAgent><name>B</name></listingAgent><listingAgent><name>C</name></listingAgent></business>\
               </propertyList>";

    let mut parser = MappingParser::new(&mapping, &["PropertyList"], NaiveCollector::new()).unwrap();
    let err = parser.parse_str(xml).unwrap_err();
    match err {
        MapError::AmbiguousRelation {
            parent_type,
            node_name,
            element_index,
            relation,
        } => {
            assert_eq!(parent_type, "Business");
            assert_eq!(node_name, "business");
            assert_eq!(element_index, 4);
            assert_eq!(relation, "agent");
        }
        other => panic!("unexpected error: {}", other),
    }
    // the first business was complete before the failure
    assert_eq!(parser.collector().len(), 1);
}

// ============================================================================
// Nested relations
// ============================================================================

#[test]
fn test_relation_with_immediate_content() {
    let mapping = Mapping::builder()
        .register(NodeSpec::builder("UrlResource").node("image").map("url", "").build().unwrap())
        .register(
            NodeSpec::builder("Listing")
                .node("listing")
                .relate_many_with("images", &["images/image"], &["UrlResource"], RelationOptions::new().parent_collects(true))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let objects = parse_fixture(&mapping, &["Listing"], "image_children");

    assert_eq!(objects.len(), 1);
    let urls: Vec<String> = objects[0]
        .relation("images")
        .unwrap()
        .objects()
        .iter()
        .map(|image| image.get("url").unwrap().to_string())
        .collect();
    assert_eq!(urls, ["http://example.com/image1.jpg", "http://example.com/image2.jpg"]);
}

#[test]
fn test_node_containing_node_of_same_name() {
    let mapping = Mapping::builder()
        .register(
            NodeSpec::builder("Image")
                .node("image")
                .map("title", "alttext")
                .map("number", "@number")
                .map("url", "image")
                .build()
                .unwrap(),
        )
        .register(
            NodeSpec::builder("Property")
                .node("property")
                .relate_many_with("images", &["images/image"], &["Image"], RelationOptions::new().parent_collects(true))
                .build()
                .unwrap(),
        )
        .register(
            NodeSpec::builder("Document")
                .node("document")
                .collect(false)
                .relate_many("properties", &["Clients/Client/properties/property"], &["Property"])
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let objects = parse_fixture(&mapping, &["Document"], "xml2u");

    assert_eq!(objects.len(), 1);
    let images = objects[0].relation("images").unwrap().objects();
    assert_eq!(images.len(), 2);
    assert_eq!(
        images[0].get("url"),
        Some(&text("http://www.euro-immo.com/photo/euro11496p107602.jpg"))
    );
    assert_eq!(images[0].get("title"), Some(&text("Front of house")));
    assert_eq!(images[1].get("number"), Some(&text("2")));
}

#[test]
fn test_wildcard_node_names() {
    let mapping = Mapping::builder()
        .register(NodeSpec::builder("Feature").node("*").map("value", "").build().unwrap())
        .register(
            NodeSpec::builder("Residential")
                .node("residential")
                .relate_many_with("features", &["features/*"], &["Feature"], RelationOptions::new().parent_collects(true))
                .build()
                .unwrap(),
        )
        .register(
            NodeSpec::builder("PropertyList")
                .node("propertyList")
                .collect(false)
                .relate_many("properties", &[], &["Residential"])
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let objects = parse_fixture(&mapping, &["PropertyList"], "reaxml");

    assert_eq!(objects.len(), 3);
    let features = objects[0].relation("features").unwrap().objects();
    let values: Vec<String> = features.iter().map(|f| f.get("value").unwrap().to_string()).collect();
    assert_eq!(
        values,
        [
            "4",
            "2",
            "1",
            "1",
            "1",
            "0",
            "0",
            "Built-In Wardrobes,Close to Schools,Close to Shops,Fireplace(s)"
        ]
    );
    let names: Vec<&str> = features.iter().map(|f| f.node_name()).collect();
    assert_eq!(
        names,
        ["bedrooms", "bathrooms", "garages", "carports", "airConditioning", "alarmSystem", "pool", "otherFeatures"]
    );
}

#[test]
fn test_two_paths_into_one_relation() {
    let mapping = Mapping::builder()
        .register(NodeSpec::builder("UrlResource").node("*").map("url", "").build().unwrap())
        .register(
            NodeSpec::builder("Listing")
                .node("listing")
                .relate_many_with(
                    "images",
                    &["images/image", "objects/floorplan"],
                    &["UrlResource"],
                    RelationOptions::new().parent_collects(true),
                )
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let objects = parse_fixture(&mapping, &["Listing"], "images_and_floorplans");

    let images: Vec<(String, String)> = objects[0]
        .relation("images")
        .unwrap()
        .objects()
        .iter()
        .map(|image| (image.node_name().to_string(), image.get("url").unwrap().to_string()))
        .collect();
    assert_eq!(
        images,
        [
            ("image".to_string(), "http://example.com/image1.jpg".to_string()),
            ("image".to_string(), "http://example.com/image2.jpg".to_string()),
            ("floorplan".to_string(), "http://example.com/image3.jpg".to_string()),
        ]
    );
}

#[test]
fn test_uncollected_chain_hangs_off_collected_root() {
    let mapping = Mapping::builder()
        .register(
            NodeSpec::builder("Order")
                .node("order")
                .map("id", "@id")
                .relate_one("shipment", &["shipment"], "Shipment")
                .build()
                .unwrap(),
        )
        .register(
            NodeSpec::builder("Shipment")
                .node("shipment")
                .collect(false)
                .relate_many("parcels", &["parcel"], &["Parcel"])
                .build()
                .unwrap(),
        )
        .register(NodeSpec::builder("Parcel").node("parcel").collect(false).map("weight", "").build().unwrap())
        .build()
        .unwrap();
    let objects = parse_doc(
        &mapping,
        &["Order"],
        "<order id=\"1\"><shipment><parcel>2</parcel><parcel>5</parcel></shipment></order>",
    );

    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].type_name(), "Order");
    let shipment = objects[0].relation("shipment").unwrap().one().unwrap();
    assert_eq!(shipment.type_name(), "Shipment");
    let weights: Vec<String> = shipment
        .relation("parcels")
        .unwrap()
        .objects()
        .iter()
        .map(|parcel| parcel.get("weight").unwrap().to_string())
        .collect();
    assert_eq!(weights, ["2", "5"]);
}

// ============================================================================
// Conditions and converters
// ============================================================================

fn geo_mapping() -> Mapping {
    Mapping::builder()
        .register(
            NodeSpec::builder("Record")
                .node("record")
                .map_with(
                    "latitude",
                    "extraFields/eField[name=geoLatitude]",
                    FieldOptions::new().converter(DecimalConverter),
                )
                .map_with(
                    "longitude",
                    "extraFields/eField[name=geoLongitude]",
                    FieldOptions::new().converter(DecimalConverter),
                )
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

#[test]
fn test_map_by_attribute_condition() {
    let mapping = geo_mapping();
    let objects = parse_fixture(&mapping, &["Record"], "extra_fields");

    let expected: AttributeBag = [("latitude", -40.61829810), ("longitude", 175.2920205)].into_iter().collect();
    assert_eq!(objects[0].attributes(), &expected);
}

#[test]
fn test_conversion_failure_names_the_path() {
    init_logging();
    let mapping = geo_mapping();
    let xml = "<record><extraFields><eField name=\"geoLatitude\">north</eField></extraFields></record>";

    let mut parser = MappingParser::new(&mapping, &["Record"], NaiveCollector::new()).unwrap();
    match parser.parse_str(xml) {
        Err(MapError::Conversion { path, raw, .. }) => {
            assert_eq!(path, "record/extraFields/eField");
            assert_eq!(raw, "north");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(parser.collector().is_empty());
}

// ============================================================================
// Map-all capture
// ============================================================================

#[test]
fn test_map_all_grabs_attributes() {
    let mapping = Mapping::builder()
        .register(NodeSpec::builder("Product").node("product").map_all().build().unwrap())
        .build()
        .unwrap();
    let objects = parse_fixture(&mapping, &["Product"], "simple_product");

    let expected: AttributeBag = [("id", "123"), ("status", "new")].into_iter().collect();
    assert_eq!(objects[0].attributes(), &expected);
}

#[test]
fn test_map_all_after_specific_fields() {
    let mapping = Mapping::builder()
        .register(
            NodeSpec::builder("Product")
                .node("product")
                .map_with("id", "@id", FieldOptions::new().converter(IntegerConverter))
                .map_all()
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let objects = parse_fixture(&mapping, &["Product"], "simple_product");

    let mut expected = AttributeBag::new();
    expected.insert("id", 123i64);
    expected.insert("status", "new");
    assert_eq!(objects[0].attributes(), &expected);
}

#[test]
fn test_map_all_recursive_nests_elements() {
    let mapping = Mapping::builder()
        .register(NodeSpec::builder("AbstractNum").node("w:abstractNum").map_all_recursive().build().unwrap())
        .register(
            NodeSpec::builder("Numbering")
                .node("w:numbering")
                .collect(false)
                .relate_many("lists", &[], &["AbstractNum"])
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let objects = parse_fixture(&mapping, &["Numbering"], "docx_abstract_num");

    assert_eq!(objects.len(), 1);
    let object = &objects[0];
    assert_eq!(object.attributes().len(), 3);
    assert_eq!(object.get("w:abstractNumId"), Some(&text("0")));

    let nsid: AttributeBag = [("w:val", "008C2EB3")].into_iter().collect();
    assert_eq!(object.get("w:nsid"), Some(&Value::Bag(nsid)));

    let bag = |pairs: &[(&str, &str)]| Value::Bag(pairs.iter().copied().collect());
    let mut r_pr = AttributeBag::new();
    r_pr.insert("w:rFonts", bag(&[("w:cs", "Times New Roman")]));
    let mut lvl = AttributeBag::new();
    lvl.insert("w:start", bag(&[("w:val", "1")]));
    lvl.insert("w:lvlJc", bag(&[("w:val", "left")]));
    lvl.insert("w:rPr", r_pr);
    lvl.insert("w:ilvl", "0");
    assert_eq!(object.get("w:lvl"), Some(&Value::Bag(lvl)));
}

#[test]
fn test_map_all_leaves_explicit_fields_alone() {
    let flat = Mapping::builder()
        .register(
            NodeSpec::builder("Item")
                .node("item")
                .map("id", "code")
                .map_all()
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let objects = parse_doc(&flat, &["Item"], "<item id=\"9\" kind=\"box\"><code>X-1</code></item>");
    assert_eq!(objects[0].get("id"), Some(&text("X-1")));
    assert_eq!(objects[0].get("kind"), Some(&text("box")));

    let recursive = Mapping::builder()
        .register(
            NodeSpec::builder("Product")
                .node("product")
                .map("name", "name")
                .map_all_recursive()
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let objects = parse_doc(
        &recursive,
        &["Product"],
        "<product><name confirmed=\"yes\">iPhone</name><price>10</price></product>",
    );
    assert_eq!(objects[0].get("name"), Some(&text("iPhone")));
    let price: AttributeBag = [("#text", "10")].into_iter().collect();
    assert_eq!(objects[0].get("price"), Some(&Value::Bag(price)));
}

#[test]
fn test_map_all_recursive_text_leaves_written_as_elements() {
    let mapping = Mapping::builder()
        .register(NodeSpec::builder("A").node("a").map_all_recursive().build().unwrap())
        .build()
        .unwrap();
    let objects = parse_doc(&mapping, &["A"], "<a k=\"1\"><b>x</b><c><d>y</d></c></a>");

    assert_eq!(
        to_xml(&objects[0]).unwrap(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <a k=\"1\">\n\
         \x20 <b>x</b>\n\
         \x20 <c>\n\
         \x20   <d>y</d>\n\
         \x20 </c>\n\
         </a>\n"
    );
}

// ============================================================================
// Collectors and input strategies
// ============================================================================

#[test]
fn test_closure_collector_sees_declared_types() {
    init_logging();
    let mapping = property_mapping();
    let mut seen = Vec::new();
    {
        let collector = |object: MappedObject, declared: &str| seen.push((declared.to_string(), object.node_name().to_string()));
        let mut parser = MappingParser::new(&mapping, &["PropertyList"], collector).unwrap();
        parser.parse_str(&read_fixture("reaxml")).unwrap();
        let stats = parser.stats();
        assert_eq!(stats.objects_collected, 4);
        assert_eq!(stats.max_depth, 3);
    }
    assert_eq!(seen[0], ("Business".to_string(), "business".to_string()));
    assert_eq!(seen.len(), 4);
}

#[test]
fn test_chunked_and_reader_input_match_whole_document() {
    init_logging();
    let mapping = property_mapping();
    let xml = read_fixture("reaxml");
    let whole = parse_fixture(&mapping, &["PropertyList"], "reaxml");

    let mut pushed = MappingParser::new(&mapping, &["PropertyList"], Vec::new()).unwrap();
    for chunk in xml.as_bytes().chunks(7) {
        pushed.feed(chunk).unwrap();
    }
    pushed.finish().unwrap();
    assert_eq!(pushed.into_collector(), whole);

    let options = ParseOptions {
        read_buffer_size: 64,
        ..ParseOptions::default()
    };
    let mut streamed = MappingParser::new(&mapping, &["PropertyList"], NaiveCollector::new())
        .unwrap()
        .with_options(options);
    streamed.parse_reader(fs::File::open(fixture_path("reaxml")).unwrap()).unwrap();
    assert_eq!(streamed.into_collector().into_objects(), whole);
}

#[test]
fn test_parser_is_reusable_after_error() {
    init_logging();
    let mapping = geo_mapping();
    let mut parser = MappingParser::new(&mapping, &["Record"], NaiveCollector::new()).unwrap();

    let bad = "<record><extraFields><eField name=\"geoLatitude\">x</eField></extraFields></record>";
    assert!(parser.parse_str(bad).is_err());
    parser.parse_str(&read_fixture("extra_fields")).unwrap();
    assert_eq!(parser.collector().len(), 1);
}

#[test]
fn test_trim_text_option() {
    init_logging();
    let mapping = Mapping::builder()
        .register(NodeSpec::builder("UrlResource").node("image").map("url", "").build().unwrap())
        .build()
        .unwrap();
    let xml = "<image>\n  http://example.com/a.jpg\n</image>";

    let mut raw = MappingParser::new(&mapping, &["UrlResource"], NaiveCollector::new()).unwrap();
    raw.parse_str(xml).unwrap();
    assert_eq!(raw.collector().mapped_objects()[0].get("url"), Some(&text("\n  http://example.com/a.jpg\n")));

    let options = ParseOptions {
        trim_text: true,
        ..ParseOptions::default()
    };
    let mut trimmed = MappingParser::new(&mapping, &["UrlResource"], NaiveCollector::new())
        .unwrap()
        .with_options(options);
    trimmed.parse_str(xml).unwrap();
    assert_eq!(trimmed.collector().mapped_objects()[0].get("url"), Some(&text("http://example.com/a.jpg")));
}

#[test]
fn test_parallel_documents() {
    init_logging();
    let mapping = property_mapping();
    let docs = vec![read_fixture("reaxml"), read_fixture("reaxml")];

    let results = map_documents(&mapping, &["PropertyList"], &docs, &ParseOptions::default()).unwrap();
    let whole = parse_fixture(&mapping, &["PropertyList"], "reaxml");
    for result in results {
        assert_eq!(result.unwrap(), whole);
    }
}
