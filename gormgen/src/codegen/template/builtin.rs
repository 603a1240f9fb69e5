//! Built-in Go templates for the three generated sections

/// Package clause and imports
pub const HEADER: &str = concat!(
    "// Code generated by gormgen. DO NOT EDIT.\n",
    "// Source: `{{DbName}}`.`{{TableName}}`\n",
    "\n",
    "package {{PkgName}}\n",
    "\n",
    "import (\n",
    "{{#if ImportTime}}\t\"time\"\n\n{{/if}}",
    "\t\"github.com/jinzhu/gorm\"\n",
    ")\n",
);

/// Model struct with tagged fields
pub const STRUCT: &str = concat!(
    "\n",
    "// {{Name}} is a row of the `{{TableName}}` table.\n",
    "type {{Name}} struct {\n",
    "{{#each Fields}}",
    "\t{{Name}} {{Type}} {{Tag}}{{#if Comment}} // {{Comment}}{{/if}}\n",
    "{{/each}}",
    "}\n",
);

/// gorm helpers bound to the model; key lookups only exist for resolved keys
pub const OBJ_API: &str = concat!(
    "\n",
    "// TableName returns the name of the table backing {{Name}}.\n",
    "func ({{Name}}) TableName() string {\n",
    "\treturn \"{{TableName}}\"\n",
    "}\n",
    "\n",
    "// Create inserts the {{LowerName}} as a new row.\n",
    "func (m *{{Name}}) Create(db *gorm.DB) error {\n",
    "\treturn db.Create(m).Error\n",
    "}\n",
    "\n",
    "// Save writes every column of the {{LowerName}} back to its table.\n",
    "func (m *{{Name}}) Save(db *gorm.DB) error {\n",
    "\treturn db.Save(m).Error\n",
    "}\n",
    "\n",
    "// Find{{Name}}List loads one page of {{Name}} rows.\n",
    "func Find{{Name}}List(db *gorm.DB, limit, offset int) ([]{{Name}}, error) {\n",
    "\tvar rows []{{Name}}\n",
    "\terr := db.Limit(limit).Offset(offset).Find(&rows).Error\n",
    "\treturn rows, err\n",
    "}\n",
    "{{#if PrimaryField}}",
    "\n",
    "// Get{{Name}}By{{PrimaryField.Name}} loads one {{Name}} by its primary key.\n",
    "func Get{{Name}}By{{PrimaryField.Name}}(db *gorm.DB, key {{PrimaryField.Type}}) (*{{Name}}, error) {\n",
    "\tvar m {{Name}}\n",
    "\tif err := db.Where(\"`{{PrimaryField.ColumnName}}` = ?\", key).First(&m).Error; err != nil {\n",
    "\t\treturn nil, err\n",
    "\t}\n",
    "\treturn &m, nil\n",
    "}\n",
    "\n",
    "// Update applies changes to the {{LowerName}} row matching its primary key.\n",
    "func (m *{{Name}}) Update(db *gorm.DB, changes map[string]interface{}) error {\n",
    "\treturn db.Model(&{{Name}}{}).Where(\"`{{PrimaryField.ColumnName}}` = ?\", m.{{PrimaryField.Name}}).Updates(changes).Error\n",
    "}\n",
    "\n",
    "// Delete removes the {{LowerName}} row matching its primary key.\n",
    "func (m *{{Name}}) Delete(db *gorm.DB) error {\n",
    "\treturn db.Where(\"`{{PrimaryField.ColumnName}}` = ?\", m.{{PrimaryField.Name}}).Delete(&{{Name}}{}).Error\n",
    "}\n",
    "{{/if}}",
    "{{#each Uniques}}",
    "\n",
    "// Get{{@root.Name}}By{{Name}} loads one {{@root.Name}} by its unique `{{ColumnName}}` column.\n",
    "func Get{{@root.Name}}By{{Name}}(db *gorm.DB, key {{Type}}) (*{{@root.Name}}, error) {\n",
    "\tvar m {{@root.Name}}\n",
    "\tif err := db.Where(\"`{{ColumnName}}` = ?\", key).First(&m).Error; err != nil {\n",
    "\t\treturn nil, err\n",
    "\t}\n",
    "\treturn &m, nil\n",
    "}\n",
    "{{/each}}",
);
