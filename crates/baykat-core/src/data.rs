//! Built-in agronomy dataset
//!
//! Crops, diseases, market prices, markets, and agro-ecological zones for
//! Senegal. The set is small enough to live in the binary as typed statics;
//! lookups accept keys or French/Wolof names and return `None` for unknown
//! entries — "not found" is the caller's business, never an error here.

use serde::Serialize;

/// A crop grown in Senegal with its cultural calendar and advice.
#[derive(Debug, Clone, Serialize)]
pub struct Crop {
    pub key: &'static str,
    pub name_fr: &'static str,
    pub name_wo: &'static str,
    pub varieties: &'static [&'static str],
    pub calendar: &'static str,
    pub soil: &'static str,
    pub water_needs: &'static str,
    pub tips: &'static str,
    pub zones: &'static [&'static str],
}

/// A disease or pest with its field diagnosis and response.
#[derive(Debug, Clone, Serialize)]
pub struct Disease {
    pub name: &'static str,
    pub crops: &'static [&'static str],
    pub symptoms: &'static str,
    pub treatment: &'static str,
    pub prevention: &'static str,
}

/// Price observation for one crop in one city, FCFA per kg.
#[derive(Debug, Clone, Serialize)]
pub struct CityPrice {
    pub city: &'static str,
    pub min: u32,
    pub max: u32,
    pub avg: u32,
}

/// Market prices for one crop across cities.
#[derive(Debug, Clone, Serialize)]
pub struct CropPrices {
    pub crop: &'static str,
    pub unit: &'static str,
    pub trend: &'static str,
    pub prices_by_city: &'static [CityPrice],
    pub season_note_fr: &'static str,
    pub season_note_wo: &'static str,
}

/// A physical market and what is traded there.
#[derive(Debug, Clone, Serialize)]
pub struct Market {
    pub name: &'static str,
    pub city: &'static str,
    pub products: &'static [&'static str],
}

/// An agro-ecological zone of Senegal.
#[derive(Debug, Clone, Serialize)]
pub struct Zone {
    pub key: &'static str,
    pub name: &'static str,
    pub climate: &'static str,
    pub soils: &'static str,
    pub crops: &'static [&'static str],
    pub challenges: &'static str,
}

pub const CROPS: &[Crop] = &[
    Crop {
        key: "arachide",
        name_fr: "Arachide",
        name_wo: "Gerte",
        varieties: &["55-437 (cycle court)", "Fleur 11", "GH 119-20"],
        calendar: "Semis en début d'hivernage (juin-juillet), récolte octobre-novembre",
        soil: "Sols sableux ou sablo-argileux bien drainés (sols dior)",
        water_needs: "450-700 mm de pluie sur le cycle, sensible aux poches de sécheresse en floraison",
        tips: "Semer dès les premières pluies utiles, démarier à 2 plants, récolter à maturité pour éviter l'aflatoxine",
        zones: &["bassin_arachidier", "senegal_oriental"],
    },
    Crop {
        key: "mil",
        name_fr: "Mil",
        name_wo: "Dugub",
        varieties: &["Souna 3", "Thialack 2", "IBV 8004"],
        calendar: "Semis juin-juillet avec les premières pluies, récolte septembre-octobre",
        soil: "Tolère les sols sableux pauvres, valorise la fumure organique",
        water_needs: "350-600 mm, très tolérant à la sécheresse",
        tips: "Semis en poquets espacés de 90 cm, démariage à 3 plants, surveiller les foreurs de tige",
        zones: &["bassin_arachidier", "sylvopastorale"],
    },
    Crop {
        key: "riz",
        name_fr: "Riz",
        name_wo: "Malo",
        varieties: &["Sahel 108", "Sahel 177", "NERICA 6"],
        calendar: "Contre-saison chaude février-juin et hivernage juillet-novembre en irrigué",
        soil: "Sols argileux hydromorphes de bas-fonds ou périmètres irrigués",
        water_needs: "Lame d'eau maîtrisée en irrigué, 1000 mm et plus en pluvial de Casamance",
        tips: "Repiquer à 21 jours, désherber tôt, drainer avant récolte pour faciliter la moisson",
        zones: &["vallee_fleuve", "casamance"],
    },
    Crop {
        key: "mais",
        name_fr: "Maïs",
        name_wo: "Mbaxal",
        varieties: &["Obatanpa", "Early Thai", "Synthétique C"],
        calendar: "Semis juin-juillet, récolte en vert dès 80 jours, sec octobre",
        soil: "Sols limoneux profonds et riches, ne supporte pas l'engorgement",
        water_needs: "500-800 mm bien répartis, critique autour de la floraison",
        tips: "Apporter l'engrais en deux fois, butter au stade 8 feuilles, lutter contre le striga par rotation",
        zones: &["casamance", "senegal_oriental"],
    },
    Crop {
        key: "niebe",
        name_fr: "Niébé",
        name_wo: "Ñebbe",
        varieties: &["Mélakh", "Yacine", "Pakau"],
        calendar: "Semis juillet sur pluies installées, récolte septembre-octobre",
        soil: "Sols sableux légers, fixe l'azote et améliore le sol",
        water_needs: "300-500 mm, le plus rustique des protéagineux",
        tips: "Excellent précédent cultural du mil, stocker les graines en fûts hermétiques contre les bruches",
        zones: &["bassin_arachidier", "sylvopastorale"],
    },
    Crop {
        key: "tomate",
        name_fr: "Tomate",
        name_wo: "Tamaate",
        varieties: &["Mongal F1", "Xina", "Roma VF"],
        calendar: "Pépinière octobre-novembre, repiquage en saison sèche froide, récolte janvier-avril",
        soil: "Sols sablo-limoneux riches en matière organique, pH 6-7",
        water_needs: "Irrigation régulière tous les 2-3 jours, éviter de mouiller le feuillage",
        tips: "Tuteurer les variétés à port indéterminé, pailler pour limiter l'évaporation, filets anti-insectes en pépinière",
        zones: &["niayes", "vallee_fleuve"],
    },
    Crop {
        key: "oignon",
        name_fr: "Oignon",
        name_wo: "Soble",
        varieties: &["Violet de Galmi", "Orient F1", "Safari"],
        calendar: "Pépinière octobre-décembre, repiquage à 45 jours, récolte février-mai",
        soil: "Sols légers et meubles des Niayes ou du Fleuve, bien nivelés",
        water_needs: "Irrigation fréquente et légère, arrêt 2 semaines avant récolte",
        tips: "Couper le feuillage à la récolte, sécher 8-10 jours au champ, stocker ventilé pour vendre à la soudure",
        zones: &["niayes", "vallee_fleuve"],
    },
];

pub const DISEASES: &[Disease] = &[
    Disease {
        name: "Rosette de l'arachide",
        crops: &["arachide"],
        symptoms: "Plants rabougris, feuilles jaunes en bouquet, transmission par pucerons",
        treatment: "Arracher et brûler les plants atteints, traiter les pucerons à l'extrait de neem",
        prevention: "Semis précoce et dense, variétés tolérantes comme la 55-437",
    },
    Disease {
        name: "Cercosporiose",
        crops: &["arachide"],
        symptoms: "Taches brunes circulaires sur les feuilles, défoliation précoce",
        treatment: "Pulvériser la bouillie bordelaise dès les premières taches",
        prevention: "Rotation de 2 ans minimum, enfouir les résidus de récolte",
    },
    Disease {
        name: "Mildiou du mil",
        crops: &["mil"],
        symptoms: "Feuilles jaunes puis blanchâtres, épis déformés en balai",
        treatment: "Arracher les plants malades avant la formation des spores",
        prevention: "Semences saines traitées, rotation avec le niébé",
    },
    Disease {
        name: "Foreurs de tige",
        crops: &["mil", "mais"],
        symptoms: "Trous dans les tiges, coeur desséché, casse au vent",
        treatment: "Traitement Bt ou solution de neem au stade montaison",
        prevention: "Détruire les chaumes après récolte, semis groupés du village",
    },
    Disease {
        name: "Striga",
        crops: &["mil", "mais"],
        symptoms: "Plante parasite à fleurs violettes au pied des céréales, plants chétifs",
        treatment: "Arrachage manuel avant floraison du striga",
        prevention: "Fumure organique forte, rotation avec niébé ou arachide",
    },
    Disease {
        name: "Pyriculariose",
        crops: &["riz"],
        symptoms: "Taches en losange gris-brun sur feuilles, cou de panicule noirci",
        treatment: "Drainer la parcelle, éviter l'excès d'azote",
        prevention: "Variétés résistantes Sahel, semences certifiées",
    },
    Disease {
        name: "Mouche blanche",
        crops: &["tomate"],
        symptoms: "Feuilles collantes, enroulement, transmission de viroses",
        treatment: "Savon noir en pulvérisation, extrait de neem le soir",
        prevention: "Filets anti-insectes en pépinière, éliminer les adventices hôtes",
    },
    Disease {
        name: "Mildiou de la tomate",
        crops: &["tomate"],
        symptoms: "Taches brunes huileuses sur feuilles et fruits par temps humide",
        treatment: "Bouillie bordelaise tous les 7 jours en période à risque",
        prevention: "Aérer les plants, arroser au pied sans mouiller le feuillage",
    },
    Disease {
        name: "Thrips de l'oignon",
        crops: &["oignon"],
        symptoms: "Stries argentées sur feuilles, pointes desséchées",
        treatment: "Extrait de neem, traiter tôt le matin",
        prevention: "Paillage, rotation, éviter les pépinières près de vieilles parcelles",
    },
];

pub const PRICES: &[CropPrices] = &[
    CropPrices {
        crop: "arachide",
        unit: "FCFA/kg",
        trend: "hausse",
        prices_by_city: &[
            CityPrice { city: "kaolack", min: 250, max: 300, avg: 275 },
            CityPrice { city: "dakar", min: 300, max: 350, avg: 325 },
            CityPrice { city: "touba", min: 260, max: 310, avg: 285 },
            CityPrice { city: "ziguinchor", min: 240, max: 290, avg: 265 },
        ],
        season_note_fr: "Prix au plus bas à la récolte (novembre-janvier), vendre après février si stockage possible",
        season_note_wo: "Njeg gi dafa wàcc ci jamonoy goob, denc ko ba fewrie su mën",
    },
    CropPrices {
        crop: "mil",
        unit: "FCFA/kg",
        trend: "stable",
        prices_by_city: &[
            CityPrice { city: "kaolack", min: 250, max: 300, avg: 275 },
            CityPrice { city: "dakar", min: 300, max: 350, avg: 325 },
            CityPrice { city: "touba", min: 260, max: 320, avg: 290 },
            CityPrice { city: "tambacounda", min: 230, max: 280, avg: 255 },
        ],
        season_note_fr: "Demande forte avant les fêtes religieuses, pic de prix à la soudure (juillet-septembre)",
        season_note_wo: "Njeg gi gën a kawe ci jamonoy soudure, juillet ba septembre",
    },
    CropPrices {
        crop: "riz",
        unit: "FCFA/kg",
        trend: "stable",
        prices_by_city: &[
            CityPrice { city: "saint-louis", min: 280, max: 320, avg: 300 },
            CityPrice { city: "dakar", min: 350, max: 400, avg: 375 },
            CityPrice { city: "ziguinchor", min: 300, max: 340, avg: 320 },
        ],
        season_note_fr: "Le riz local de la Vallée se vend mieux décortiqué et bien trié",
        season_note_wo: "Malo bu Walo gën a jar bu ñu ko setal te tànn ko bu baax",
    },
    CropPrices {
        crop: "mais",
        unit: "FCFA/kg",
        trend: "baisse",
        prices_by_city: &[
            CityPrice { city: "kaolack", min: 200, max: 250, avg: 225 },
            CityPrice { city: "tambacounda", min: 180, max: 230, avg: 205 },
            CityPrice { city: "dakar", min: 250, max: 300, avg: 275 },
        ],
        season_note_fr: "Prix en baisse à la récolte d'octobre, la vente en vert rapporte plus près des villes",
        season_note_wo: "Njeg gi wàcc na ci oktoobar, jaay ko bu tooy gën a jariñ ci wetu dëkk yu mag",
    },
    CropPrices {
        crop: "niebe",
        unit: "FCFA/kg",
        trend: "hausse",
        prices_by_city: &[
            CityPrice { city: "louga", min: 350, max: 450, avg: 400 },
            CityPrice { city: "dakar", min: 450, max: 550, avg: 500 },
            CityPrice { city: "thies", min: 400, max: 480, avg: 440 },
        ],
        season_note_fr: "Conserver en fûts hermétiques et vendre à partir de mars quand l'offre chute",
        season_note_wo: "Denc ko ci barigo bu ñu ub bu baax, jaay ko ci mars ba ëpp",
    },
    CropPrices {
        crop: "tomate",
        unit: "FCFA/kg",
        trend: "baisse",
        prices_by_city: &[
            CityPrice { city: "dakar", min: 300, max: 500, avg: 400 },
            CityPrice { city: "thies", min: 250, max: 400, avg: 325 },
            CityPrice { city: "saint-louis", min: 200, max: 350, avg: 275 },
        ],
        season_note_fr: "Saturation en pleine campagne des Niayes (février-avril), viser la précocité ou la transformation",
        season_note_wo: "Ci fewrie ba awril tamaate dafa bari, jëkk a jaay wala defar ko mooy gën",
    },
    CropPrices {
        crop: "oignon",
        unit: "FCFA/kg",
        trend: "stable",
        prices_by_city: &[
            CityPrice { city: "dakar", min: 250, max: 400, avg: 325 },
            CityPrice { city: "saint-louis", min: 200, max: 300, avg: 250 },
            CityPrice { city: "louga", min: 220, max: 320, avg: 270 },
        ],
        season_note_fr: "Le gel des importations pendant la campagne locale soutient les prix, stocker sec et ventilé",
        season_note_wo: "Bu campagne bi jotee importation dañu ko taxawal, denc soble bu wow ci fu am ngelaw",
    },
];

pub const MARKETS: &[Market] = &[
    Market {
        name: "Sandaga",
        city: "dakar",
        products: &["céréales", "arachide", "légumes"],
    },
    Market {
        name: "Thiaroye",
        city: "dakar",
        products: &["légumes", "fruits", "oignon"],
    },
    Market {
        name: "Marché central de Kaolack",
        city: "kaolack",
        products: &["arachide", "mil", "sel"],
    },
    Market {
        name: "Touba Ocass",
        city: "touba",
        products: &["céréales", "légumes", "niébé"],
    },
    Market {
        name: "Marché Sor",
        city: "saint-louis",
        products: &["riz", "oignon", "tomate"],
    },
    Market {
        name: "Marché Escale",
        city: "ziguinchor",
        products: &["riz", "mangue", "huile de palme"],
    },
];

pub const ZONES: &[Zone] = &[
    Zone {
        key: "niayes",
        name: "Niayes",
        climate: "Bande côtière fraîche et humide, alizés maritimes toute l'année",
        soils: "Sols sableux avec nappes peu profondes dans les dépressions",
        crops: &["tomate", "oignon", "chou", "carotte"],
        challenges: "Salinisation des nappes, urbanisation, vent de sable sur pépinières",
    },
    Zone {
        key: "bassin_arachidier",
        name: "Bassin Arachidier",
        climate: "Soudano-sahélien, 400-800 mm de pluie sur 4 mois",
        soils: "Sols dior sableux épuisés par la monoculture, sols deck plus lourds",
        crops: &["arachide", "mil", "niebe"],
        challenges: "Fertilité en baisse, pluies irrégulières, morcellement des terres",
    },
    Zone {
        key: "casamance",
        name: "Casamance",
        climate: "Soudano-guinéen humide, plus de 1000 mm de pluie",
        soils: "Sols ferralitiques riches, bas-fonds rizicoles, mangroves",
        crops: &["riz", "mais", "mangue"],
        challenges: "Salinisation des rizières basses, enclavement des marchés",
    },
    Zone {
        key: "vallee_fleuve",
        name: "Vallée du Fleuve",
        climate: "Sahélien sec compensé par l'irrigation du fleuve Sénégal",
        soils: "Sols alluviaux hollaldé argileux et fondé limoneux",
        crops: &["riz", "tomate", "oignon"],
        challenges: "Coût de l'irrigation, typha dans les canaux, oiseaux granivores",
    },
    Zone {
        key: "sylvopastorale",
        name: "Zone Sylvo-pastorale",
        climate: "Sahélien, 300-500 mm, longue saison sèche",
        soils: "Sols sableux profonds, parcours naturels",
        crops: &["mil", "niebe"],
        challenges: "Feux de brousse, pression du bétail, accès à l'eau",
    },
    Zone {
        key: "senegal_oriental",
        name: "Sénégal Oriental",
        climate: "Soudanien, 700-1000 mm, fortes chaleurs en fin de saison sèche",
        soils: "Sols gravillonnaires et sols limoneux de vallées",
        crops: &["coton", "mais", "arachide"],
        challenges: "Pistes difficiles en hivernage, divagation des animaux",
    },
];

/// Look up a crop by key or by French/Wolof name, case-insensitive.
pub fn get_crop(name: &str) -> Option<&'static Crop> {
    let key = name.trim().to_lowercase();
    CROPS.iter().find(|c| {
        c.key == key || c.name_fr.to_lowercase() == key || c.name_wo.to_lowercase() == key
    })
}

/// Diseases recorded against a crop key. Empty when none are known.
pub fn diseases_for_crop(crop: &str) -> Vec<&'static Disease> {
    let key = crop.trim().to_lowercase();
    DISEASES
        .iter()
        .filter(|d| d.crops.iter().any(|c| *c == key))
        .collect()
}

/// Price table for a crop key, if tracked.
pub fn get_prices(crop: &str) -> Option<&'static CropPrices> {
    let key = crop.trim().to_lowercase();
    PRICES.iter().find(|p| p.crop == key)
}

/// Markets located in a city. Empty when the city has none recorded.
pub fn markets_for_city(city: &str) -> Vec<&'static Market> {
    let key = city.trim().to_lowercase();
    MARKETS.iter().filter(|m| m.city == key).collect()
}

/// Agro-ecological zone by key.
pub fn get_zone(zone: &str) -> Option<&'static Zone> {
    let key = zone.trim().to_lowercase();
    ZONES.iter().find(|z| z.key == key)
}
