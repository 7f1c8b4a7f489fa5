//! ISO 3166 reference data backing `IsoCatalog`.
//!
//! `COUNTRIES` is the full ISO 3166-1 list with the short names used by the
//! ISO 3166 Maintenance Agency. `COUNTRY_ALIASES` adds common English names,
//! former names and German names. `SUBDIVISIONS` covers ISO 3166-2 for the
//! German-speaking home countries, under their local names.

/// (alpha-2, ISO short name)
pub const COUNTRIES: &[(&str, &str)] = &[
    ("AD", "Andorra"),
    ("AE", "United Arab Emirates"),
    ("AF", "Afghanistan"),
    ("AG", "Antigua and Barbuda"),
    ("AI", "Anguilla"),
    ("AL", "Albania"),
    ("AM", "Armenia"),
    ("AO", "Angola"),
    ("AQ", "Antarctica"),
    ("AR", "Argentina"),
    ("AS", "American Samoa"),
    ("AT", "Austria"),
    ("AU", "Australia"),
    ("AW", "Aruba"),
    ("AX", "Åland Islands"),
    ("AZ", "Azerbaijan"),
    ("BA", "Bosnia and Herzegovina"),
    ("BB", "Barbados"),
    ("BD", "Bangladesh"),
    ("BE", "Belgium"),
    ("BF", "Burkina Faso"),
    ("BG", "Bulgaria"),
    ("BH", "Bahrain"),
    ("BI", "Burundi"),
    ("BJ", "Benin"),
    ("BL", "Saint Barthélemy"),
    ("BM", "Bermuda"),
    ("BN", "Brunei Darussalam"),
    ("BO", "Bolivia, Plurinational State of"),
    ("BQ", "Bonaire, Sint Eustatius and Saba"),
    ("BR", "Brazil"),
    ("BS", "Bahamas"),
    ("BT", "Bhutan"),
    ("BV", "Bouvet Island"),
    ("BW", "Botswana"),
    ("BY", "Belarus"),
    ("BZ", "Belize"),
    ("CA", "Canada"),
    ("CC", "Cocos (Keeling) Islands"),
    ("CD", "Congo, The Democratic Republic of the"),
    ("CF", "Central African Republic"),
    ("CG", "Congo"),
    ("CH", "Switzerland"),
    ("CI", "Côte d'Ivoire"),
    ("CK", "Cook Islands"),
    ("CL", "Chile"),
    ("CM", "Cameroon"),
    ("CN", "China"),
    ("CO", "Colombia"),
    ("CR", "Costa Rica"),
    ("CU", "Cuba"),
    ("CV", "Cabo Verde"),
    ("CW", "Curaçao"),
    ("CX", "Christmas Island"),
    ("CY", "Cyprus"),
    ("CZ", "Czechia"),
    ("DE", "Germany"),
    ("DJ", "Djibouti"),
    ("DK", "Denmark"),
    ("DM", "Dominica"),
    ("DO", "Dominican Republic"),
    ("DZ", "Algeria"),
    ("EC", "Ecuador"),
    ("EE", "Estonia"),
    ("EG", "Egypt"),
    ("EH", "Western Sahara"),
    ("ER", "Eritrea"),
    ("ES", "Spain"),
    ("ET", "Ethiopia"),
    ("FI", "Finland"),
    ("FJ", "Fiji"),
    ("FK", "Falkland Islands (Malvinas)"),
    ("FM", "Micronesia, Federated States of"),
    ("FO", "Faroe Islands"),
    ("FR", "France"),
    ("GA", "Gabon"),
    ("GB", "United Kingdom"),
    ("GD", "Grenada"),
    ("GE", "Georgia"),
    ("GF", "French Guiana"),
    ("GG", "Guernsey"),
    ("GH", "Ghana"),
    ("GI", "Gibraltar"),
    ("GL", "Greenland"),
    ("GM", "Gambia"),
    ("GN", "Guinea"),
    ("GP", "Guadeloupe"),
    ("GQ", "Equatorial Guinea"),
    ("GR", "Greece"),
    ("GS", "South Georgia and the South Sandwich Islands"),
    ("GT", "Guatemala"),
    ("GU", "Guam"),
    ("GW", "Guinea-Bissau"),
    ("GY", "Guyana"),
    ("HK", "Hong Kong"),
    ("HM", "Heard Island and McDonald Islands"),
    ("HN", "Honduras"),
    ("HR", "Croatia"),
    ("HT", "Haiti"),
    ("HU", "Hungary"),
    ("ID", "Indonesia"),
    ("IE", "Ireland"),
    ("IL", "Israel"),
    ("IM", "Isle of Man"),
    ("IN", "India"),
    ("IO", "British Indian Ocean Territory"),
    ("IQ", "Iraq"),
    ("IR", "Iran, Islamic Republic of"),
    ("IS", "Iceland"),
    ("IT", "Italy"),
    ("JE", "Jersey"),
    ("JM", "Jamaica"),
    ("JO", "Jordan"),
    ("JP", "Japan"),
    ("KE", "Kenya"),
    ("KG", "Kyrgyzstan"),
    ("KH", "Cambodia"),
    ("KI", "Kiribati"),
    ("KM", "Comoros"),
    ("KN", "Saint Kitts and Nevis"),
    ("KP", "Korea, Democratic People's Republic of"),
    ("KR", "Korea, Republic of"),
    ("KW", "Kuwait"),
    ("KY", "Cayman Islands"),
    ("KZ", "Kazakhstan"),
    ("LA", "Lao People's Democratic Republic"),
    ("LB", "Lebanon"),
    ("LC", "Saint Lucia"),
    ("LI", "Liechtenstein"),
    ("LK", "Sri Lanka"),
    ("LR", "Liberia"),
    ("LS", "Lesotho"),
    ("LT", "Lithuania"),
    ("LU", "Luxembourg"),
    ("LV", "Latvia"),
    ("LY", "Libya"),
    ("MA", "Morocco"),
    ("MC", "Monaco"),
    ("MD", "Moldova, Republic of"),
    ("ME", "Montenegro"),
    ("MF", "Saint Martin (French part)"),
    ("MG", "Madagascar"),
    ("MH", "Marshall Islands"),
    ("MK", "North Macedonia"),
    ("ML", "Mali"),
    ("MM", "Myanmar"),
    ("MN", "Mongolia"),
    ("MO", "Macao"),
    ("MP", "Northern Mariana Islands"),
    ("MQ", "Martinique"),
    ("MR", "Mauritania"),
    ("MS", "Montserrat"),
    ("MT", "Malta"),
    ("MU", "Mauritius"),
    ("MV", "Maldives"),
    ("MW", "Malawi"),
    ("MX", "Mexico"),
    ("MY", "Malaysia"),
    ("MZ", "Mozambique"),
    ("NA", "Namibia"),
    ("NC", "New Caledonia"),
    ("NE", "Niger"),
    ("NF", "Norfolk Island"),
    ("NG", "Nigeria"),
    ("NI", "Nicaragua"),
    ("NL", "Netherlands"),
    ("NO", "Norway"),
    ("NP", "Nepal"),
    ("NR", "Nauru"),
    ("NU", "Niue"),
    ("NZ", "New Zealand"),
    ("OM", "Oman"),
    ("PA", "Panama"),
    ("PE", "Peru"),
    ("PF", "French Polynesia"),
    ("PG", "Papua New Guinea"),
    ("PH", "Philippines"),
    ("PK", "Pakistan"),
    ("PL", "Poland"),
    ("PM", "Saint Pierre and Miquelon"),
    ("PN", "Pitcairn"),
    ("PR", "Puerto Rico"),
    ("PS", "Palestine, State of"),
    ("PT", "Portugal"),
    ("PW", "Palau"),
    ("PY", "Paraguay"),
    ("QA", "Qatar"),
    ("RE", "Réunion"),
    ("RO", "Romania"),
    ("RS", "Serbia"),
    ("RU", "Russian Federation"),
    ("RW", "Rwanda"),
    ("SA", "Saudi Arabia"),
    ("SB", "Solomon Islands"),
    ("SC", "Seychelles"),
    ("SD", "Sudan"),
    ("SE", "Sweden"),
    ("SG", "Singapore"),
    ("SH", "Saint Helena, Ascension and Tristan da Cunha"),
    ("SI", "Slovenia"),
    ("SJ", "Svalbard and Jan Mayen"),
    ("SK", "Slovakia"),
    ("SL", "Sierra Leone"),
    ("SM", "San Marino"),
    ("SN", "Senegal"),
    ("SO", "Somalia"),
    ("SR", "Suriname"),
    ("SS", "South Sudan"),
    ("ST", "Sao Tome and Principe"),
    ("SV", "El Salvador"),
    ("SX", "Sint Maarten (Dutch part)"),
    ("SY", "Syrian Arab Republic"),
    ("SZ", "Eswatini"),
    ("TC", "Turks and Caicos Islands"),
    ("TD", "Chad"),
    ("TF", "French Southern Territories"),
    ("TG", "Togo"),
    ("TH", "Thailand"),
    ("TJ", "Tajikistan"),
    ("TK", "Tokelau"),
    ("TL", "Timor-Leste"),
    ("TM", "Turkmenistan"),
    ("TN", "Tunisia"),
    ("TO", "Tonga"),
    ("TR", "Türkiye"),
    ("TT", "Trinidad and Tobago"),
    ("TV", "Tuvalu"),
    ("TW", "Taiwan, Province of China"),
    ("TZ", "Tanzania, United Republic of"),
    ("UA", "Ukraine"),
    ("UG", "Uganda"),
    ("UM", "United States Minor Outlying Islands"),
    ("US", "United States"),
    ("UY", "Uruguay"),
    ("UZ", "Uzbekistan"),
    ("VA", "Holy See (Vatican City State)"),
    ("VC", "Saint Vincent and the Grenadines"),
    ("VE", "Venezuela, Bolivarian Republic of"),
    ("VG", "Virgin Islands, British"),
    ("VI", "Virgin Islands, U.S."),
    ("VN", "Viet Nam"),
    ("VU", "Vanuatu"),
    ("WF", "Wallis and Futuna"),
    ("WS", "Samoa"),
    ("YE", "Yemen"),
    ("YT", "Mayotte"),
    ("ZA", "South Africa"),
    ("ZM", "Zambia"),
    ("ZW", "Zimbabwe"),
];

/// (alternative name, alpha-2)
pub const COUNTRY_ALIASES: &[(&str, &str)] = &[
    // common and former English names
    ("Bolivia", "BO"),
    ("Brunei", "BN"),
    ("Burma", "MM"),
    ("Cape Verde", "CV"),
    ("Czech Republic", "CZ"),
    ("Democratic Republic of the Congo", "CD"),
    ("East Timor", "TL"),
    ("Great Britain", "GB"),
    ("Holy See", "VA"),
    ("Iran", "IR"),
    ("Ivory Coast", "CI"),
    ("Laos", "LA"),
    ("Macau", "MO"),
    ("Macedonia", "MK"),
    ("Micronesia", "FM"),
    ("Moldova", "MD"),
    ("Netherlands, Kingdom of the", "NL"),
    ("North Korea", "KP"),
    ("Palestine", "PS"),
    ("Russia", "RU"),
    ("South Korea", "KR"),
    ("Swaziland", "SZ"),
    ("Syria", "SY"),
    ("Taiwan", "TW"),
    ("Tanzania", "TZ"),
    ("Turkey", "TR"),
    ("United Kingdom of Great Britain and Northern Ireland", "GB"),
    ("United States of America", "US"),
    ("USA", "US"),
    ("Vatican City", "VA"),
    ("Venezuela", "VE"),
    ("Vietnam", "VN"),
    // German names
    ("Ägypten", "EG"),
    ("Albanien", "AL"),
    ("Algerien", "DZ"),
    ("Argentinien", "AR"),
    ("Armenien", "AM"),
    ("Aserbaidschan", "AZ"),
    ("Äthiopien", "ET"),
    ("Australien", "AU"),
    ("Belgien", "BE"),
    ("Bosnien und Herzegowina", "BA"),
    ("Brasilien", "BR"),
    ("Bulgarien", "BG"),
    ("Dänemark", "DK"),
    ("Deutschland", "DE"),
    ("Estland", "EE"),
    ("Finnland", "FI"),
    ("Frankreich", "FR"),
    ("Georgien", "GE"),
    ("Griechenland", "GR"),
    ("Großbritannien", "GB"),
    ("Indien", "IN"),
    ("Indonesien", "ID"),
    ("Irak", "IQ"),
    ("Irland", "IE"),
    ("Island", "IS"),
    ("Italien", "IT"),
    ("Jemen", "YE"),
    ("Jordanien", "JO"),
    ("Kanada", "CA"),
    ("Kasachstan", "KZ"),
    ("Kolumbien", "CO"),
    ("Kroatien", "HR"),
    ("Kuba", "CU"),
    ("Lettland", "LV"),
    ("Libanon", "LB"),
    ("Litauen", "LT"),
    ("Luxemburg", "LU"),
    ("Marokko", "MA"),
    ("Mexiko", "MX"),
    ("Moldau", "MD"),
    ("Neuseeland", "NZ"),
    ("Niederlande", "NL"),
    ("Nordkorea", "KP"),
    ("Nordmazedonien", "MK"),
    ("Norwegen", "NO"),
    ("Österreich", "AT"),
    ("Polen", "PL"),
    ("Rumänien", "RO"),
    ("Russische Föderation", "RU"),
    ("Russland", "RU"),
    ("Saudi-Arabien", "SA"),
    ("Schweden", "SE"),
    ("Schweiz", "CH"),
    ("Serbien", "RS"),
    ("Slowakei", "SK"),
    ("Slowenien", "SI"),
    ("Spanien", "ES"),
    ("Südafrika", "ZA"),
    ("Südkorea", "KR"),
    ("Syrien", "SY"),
    ("Tschechien", "CZ"),
    ("Tschechische Republik", "CZ"),
    ("Tunesien", "TN"),
    ("Türkei", "TR"),
    ("Ungarn", "HU"),
    ("Vereinigte Arabische Emirate", "AE"),
    ("Vereinigte Staaten", "US"),
    ("Vereinigte Staaten von Amerika", "US"),
    ("Vereinigtes Königreich", "GB"),
    ("Weißrussland", "BY"),
    ("Zypern", "CY"),
];

/// (country alpha-2, subdivision code, local name)
pub const SUBDIVISIONS: &[(&str, &str, &str)] = &[
    ("AT", "AT-1", "Burgenland"),
    ("AT", "AT-2", "Kärnten"),
    ("AT", "AT-3", "Niederösterreich"),
    ("AT", "AT-4", "Oberösterreich"),
    ("AT", "AT-5", "Salzburg"),
    ("AT", "AT-6", "Steiermark"),
    ("AT", "AT-7", "Tirol"),
    ("AT", "AT-8", "Vorarlberg"),
    ("AT", "AT-9", "Wien"),
    ("CH", "CH-AG", "Aargau"),
    ("CH", "CH-AI", "Appenzell Innerrhoden"),
    ("CH", "CH-AR", "Appenzell Ausserrhoden"),
    ("CH", "CH-BE", "Bern"),
    ("CH", "CH-BL", "Basel-Landschaft"),
    ("CH", "CH-BS", "Basel-Stadt"),
    ("CH", "CH-FR", "Fribourg"),
    ("CH", "CH-GE", "Genève"),
    ("CH", "CH-GL", "Glarus"),
    ("CH", "CH-GR", "Graubünden"),
    ("CH", "CH-JU", "Jura"),
    ("CH", "CH-LU", "Luzern"),
    ("CH", "CH-NE", "Neuchâtel"),
    ("CH", "CH-NW", "Nidwalden"),
    ("CH", "CH-OW", "Obwalden"),
    ("CH", "CH-SG", "Sankt Gallen"),
    ("CH", "CH-SH", "Schaffhausen"),
    ("CH", "CH-SO", "Solothurn"),
    ("CH", "CH-SZ", "Schwyz"),
    ("CH", "CH-TG", "Thurgau"),
    ("CH", "CH-TI", "Ticino"),
    ("CH", "CH-UR", "Uri"),
    ("CH", "CH-VD", "Vaud"),
    ("CH", "CH-VS", "Valais"),
    ("CH", "CH-ZG", "Zug"),
    ("CH", "CH-ZH", "Zürich"),
    ("DE", "DE-BW", "Baden-Württemberg"),
    ("DE", "DE-BY", "Bayern"),
    ("DE", "DE-BE", "Berlin"),
    ("DE", "DE-BB", "Brandenburg"),
    ("DE", "DE-HB", "Bremen"),
    ("DE", "DE-HH", "Hamburg"),
    ("DE", "DE-HE", "Hessen"),
    ("DE", "DE-MV", "Mecklenburg-Vorpommern"),
    ("DE", "DE-NI", "Niedersachsen"),
    ("DE", "DE-NW", "Nordrhein-Westfalen"),
    ("DE", "DE-RP", "Rheinland-Pfalz"),
    ("DE", "DE-SL", "Saarland"),
    ("DE", "DE-SN", "Sachsen"),
    ("DE", "DE-ST", "Sachsen-Anhalt"),
    ("DE", "DE-SH", "Schleswig-Holstein"),
    ("DE", "DE-TH", "Thüringen"),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_country_table_is_complete() {
        assert_eq!(COUNTRIES.len(), 249);
        let codes: HashSet<&str> = COUNTRIES.iter().map(|(code, _)| *code).collect();
        assert_eq!(codes.len(), COUNTRIES.len());
        assert!(codes.iter().all(|c| c.len() == 2));
    }

    #[test]
    fn test_aliases_point_at_known_codes() {
        let codes: HashSet<&str> = COUNTRIES.iter().map(|(code, _)| *code).collect();
        for (alias, code) in COUNTRY_ALIASES {
            assert!(codes.contains(code), "alias {alias} -> unknown code {code}");
        }
    }

    #[test]
    fn test_subdivision_codes_prefixed_by_country() {
        for (country, code, _) in SUBDIVISIONS {
            assert!(code.starts_with(&format!("{country}-")));
        }
        let german = SUBDIVISIONS.iter().filter(|(c, _, _)| *c == "DE").count();
        assert_eq!(german, 16);
    }
}
